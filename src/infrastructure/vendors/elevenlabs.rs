use actix_web::web::Bytes;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Serialize;

use crate::{
    errors::AppError,
    repositories::vendors::SpeechSynthesizer,
    settings::ElevenLabsConfig,
};

use super::{http_client, upstream_failure};

const VENDOR: &str = "ElevenLabs";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            stability: 0.5,
            similarity_boost: 0.5,
            style: 0.5,
            use_speaker_boost: true,
        }
    }
}

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    default_voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn from_config(config: &ElevenLabsConfig) -> Result<Option<Self>, AppError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        Ok(Some(ElevenLabsClient {
            client: http_client()?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_voice_id: config.default_voice_id.clone(),
            model_id: config.model_id.clone(),
        }))
    }

    fn endpoint(&self, voice_id: Option<&str>) -> String {
        let voice = voice_id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&self.default_voice_id);
        format!("{}/v1/text-to-speech/{}", self.base_url, urlencoding::encode(voice))
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str, voice_id: Option<String>) -> Result<Bytes, AppError> {
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .client
            .post(self.endpoint(voice_id.as_deref()))
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_failure(VENDOR, response).await);
        }

        Ok(response.bytes().await?)
    }
}
