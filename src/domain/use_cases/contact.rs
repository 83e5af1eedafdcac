use std::sync::Arc;

use ammonia::clean_text;
use validator::Validate;

use crate::{
    entities::contact_me::{ContactMeForm, ContactMeResponse, OutboundEmail},
    errors::AppError,
    repositories::vendors::Mailer,
};

/// Relays the public contact form to the gallery owner by email.
pub struct ContactHandler {
    pub mailer: Option<Arc<dyn Mailer>>,
    pub from: String,
    pub to: Option<String>,
}

impl ContactHandler {
    pub async fn send_message(&self, form: ContactMeForm) -> Result<ContactMeResponse, AppError> {
        form.validate()?;

        let (mailer, to) = match (&self.mailer, &self.to) {
            (Some(mailer), Some(to)) => (mailer, to),
            _ => return Err(AppError::ServiceUnavailable("Contact form is not configured".into())),
        };

        let email = compose_email(&form, &self.from, to);
        mailer.send(&email).await?;

        Ok(ContactMeResponse { success: true })
    }
}

/// Builds the notification. Every user supplied value is HTML-escaped.
pub fn compose_email(form: &ContactMeForm, from: &str, to: &str) -> OutboundEmail {
    let name = form.name.trim();
    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #333;">New Contact Form Submission</h2>
<hr style="border: 1px solid #eee;" />
<p><strong>Name:</strong> {name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Message:</strong></p>
<div style="background: #f9f9f9; padding: 16px; border-radius: 8px; white-space: pre-wrap;">{message}</div>
<hr style="border: 1px solid #eee; margin-top: 24px;" />
<p style="color: #999; font-size: 12px;">Sent from the gallery contact form</p>
</div>"#,
        name = clean_text(name),
        email = clean_text(form.email.trim()),
        message = clean_text(form.message.trim()),
    );

    OutboundEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        // Subjects are plain text; strip line breaks that could fold headers
        subject: format!("New Contact Form: {}", name.replace(['\r', '\n'], " ")),
        html,
        reply_to: form.email.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::vendors::MockMailer;

    fn form(name: &str, message: &str) -> ContactMeForm {
        ContactMeForm {
            name: name.into(),
            email: "visitor@example.com".into(),
            message: message.into(),
        }
    }

    #[test]
    fn user_values_are_escaped() {
        let email = compose_email(
            &form("<b>Eve</b>", "<script>alert(1)</script>"),
            "Gallery <noreply@example.com>",
            "owner@example.com",
        );

        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert_eq!(email.subject, "New Contact Form: <b>Eve</b>");
        assert_eq!(email.reply_to, "visitor@example.com");
    }

    #[actix_rt::test]
    async fn sends_through_mailer() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.to == vec!["owner@example.com".to_string()])
            .times(1)
            .returning(|_| Ok(()));

        let handler = ContactHandler {
            mailer: Some(Arc::new(mailer)),
            from: "Gallery <noreply@example.com>".into(),
            to: Some("owner@example.com".into()),
        };

        let response = handler.send_message(form("Ada", "Loved the street series")).await.unwrap();
        assert!(response.success);
    }

    #[actix_rt::test]
    async fn invalid_email_is_rejected_before_sending() {
        let handler = ContactHandler {
            mailer: Some(Arc::new(MockMailer::new())),
            from: "x".into(),
            to: Some("owner@example.com".into()),
        };
        let mut bad = form("Ada", "Hi");
        bad.email = "not-an-email".into();

        assert!(matches!(handler.send_message(bad).await, Err(AppError::ValidationError(_))));
    }

    #[actix_rt::test]
    async fn unconfigured_mailer_is_unavailable() {
        let handler = ContactHandler { mailer: None, from: "x".into(), to: None };
        let result = handler.send_message(form("Ada", "Hi")).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }
}
