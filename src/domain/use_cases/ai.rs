use std::sync::Arc;

use actix_web::web::Bytes;
use validator::Validate;

use crate::{
    entities::ai::{
        DescribeImageRequest, DescribeImageResponse, NarrateRequest, TranslateRequest, TranslateResponse,
    },
    errors::AppError,
    imaging,
    repositories::vendors::{GenerativeModel, SpeechSynthesizer},
};

/// Public AI proxy endpoints. Vendor keys stay on the server.
pub struct AiHandler {
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
}

impl AiHandler {
    fn model(&self) -> Result<&Arc<dyn GenerativeModel>, AppError> {
        self.model
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("AI captions are not configured".into()))
    }

    /// Captions an uploaded image. Large images are shrunk before leaving the server.
    pub async fn describe(&self, request: DescribeImageRequest) -> Result<DescribeImageResponse, AppError> {
        request.validate()?;
        let model = self.model()?;

        let bytes = imaging::decode_base64(&request.image_base64)?;
        if imaging::sniff_image_mime(&bytes).is_none() {
            return Err(AppError::field("imageBase64", "Data is not a supported image"));
        }
        let image = imaging::downscale_for_caption(&bytes)?;

        let description = model.describe_image(&image).await?;
        Ok(DescribeImageResponse { description })
    }

    pub async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, AppError> {
        request.validate()?;
        let model = self.model()?;

        let translated_text = model.translate(&request.text, request.target_language.trim()).await?;
        Ok(TranslateResponse { translated_text })
    }

    pub async fn narrate(&self, request: NarrateRequest) -> Result<Bytes, AppError> {
        request.validate()?;
        let speech = self
            .speech
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("Narration is not configured".into()))?;

        speech.synthesize(&request.text, request.voice_id).await
    }
}
