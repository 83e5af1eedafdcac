use actix_web::web::Bytes;
use async_trait::async_trait;

use crate::{
    entities::{ai::CaptionImage, contact_me::OutboundEmail},
    errors::AppError,
};

/// Generative text model used for captions and translations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn describe_image(&self, image: &CaptionImage) -> Result<String, AppError>;
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns `audio/mpeg` bytes. `None` selects the configured default voice.
    async fn synthesize(&self, text: &str, voice_id: Option<String>) -> Result<Bytes, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError>;
}
