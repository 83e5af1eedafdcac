use serde::{Deserialize, Serialize};
use validator::Validate;

const MAX_TEXT_LENGTH: u64 = 5000;

pub const DEFAULT_TARGET_LANGUAGE: &str = "Spanish";
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Base64 image ready to hand to the captioning model.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionImage {
    pub base64: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DescribeImageRequest {
    #[validate(length(min = 1, message = "Image data is required"))]
    pub image_base64: String,

    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescribeImageResponse {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[validate(length(min = 1, max = MAX_TEXT_LENGTH, message = "Text is required"))]
    pub text: String,

    #[serde(default = "default_target_language")]
    #[validate(length(min = 2, max = 40))]
    pub target_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NarrateRequest {
    #[validate(length(min = 1, max = MAX_TEXT_LENGTH, message = "Text is required"))]
    pub text: String,

    #[validate(length(min = 1, max = 64))]
    pub voice_id: Option<String>,
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}
