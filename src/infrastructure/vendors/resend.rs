use async_trait::async_trait;
use serde::Serialize;

use crate::{
    entities::contact_me::OutboundEmail,
    errors::AppError,
    repositories::vendors::Mailer,
    settings::ResendConfig,
};

use super::{http_client, upstream_failure};

const VENDOR: &str = "Resend";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

impl<'a> From<&'a OutboundEmail> for SendEmailRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        SendEmailRequest {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            reply_to: &email.reply_to,
        }
    }
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn from_config(config: &ResendConfig) -> Result<Option<Self>, AppError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        Ok(Some(ResendMailer {
            client: http_client()?,
            api_key,
            endpoint: format!("{}/emails", config.base_url.trim_end_matches('/')),
        }))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest::from(email))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_failure(VENDOR, response).await);
        }

        tracing::info!(subject = %email.subject, "Contact email relayed");
        Ok(())
    }
}
