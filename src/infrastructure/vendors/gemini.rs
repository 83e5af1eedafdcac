use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    entities::ai::CaptionImage,
    errors::AppError,
    repositories::vendors::GenerativeModel,
    settings::GeminiConfig,
};

use super::{http_client, upstream_failure};

const VENDOR: &str = "Gemini";

pub const CAPTION_PROMPT: &str = "You are Sir David Attenborough narrating a photograph. \
Describe this image with poetic drama, scientific insight, subtle wit, and deep emotional resonance. \
Your narration should captivate the audience as if you're revealing one of nature's most extraordinary moments. \
Include sensory details that make the viewer feel present in the scene. \
Keep it under 100 words but make every word count. \
Speak directly as if narrating a documentary - no \"I see\" or \"This image shows\".";

pub fn translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following art/photography description into {target_language}. \
         Keep the tone artistic, professional, and evocative. \
         Do not add explanations, just return the translated text.\n\n{text}"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    /// `None` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, AppError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        Ok(Some(GeminiClient {
            client: http_client()?,
            api_key,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        }))
    }

    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, AppError> {
        let body = GenerateRequest { contents: [Content { parts }] };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_failure(VENDOR, response).await);
        }

        response
            .json::<GenerateResponse>()
            .await?
            .into_text()
            .ok_or_else(|| AppError::Upstream("Gemini returned no text".into()))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn describe_image(&self, image: &CaptionImage) -> Result<String, AppError> {
        self.generate(vec![
            Part::Text { text: CAPTION_PROMPT },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.base64,
                },
            },
        ])
        .await
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String, AppError> {
        let prompt = translation_prompt(text, target_language);
        self.generate(vec![Part::Text { text: &prompt }]).await
    }
}
