use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, imaging, limiter, storage, utils, vendors};

use auth::jwt::JwtService;
use errors::AppError;
use limiter::rate_limiter::RateLimiter;
use repositories::{
    category::CategoryRepository,
    image::ImageRepository,
    sqlx_repo::{SqlxCategoryRepo, SqlxImageRepo},
    storage::ObjectStorage,
    token::TokenService,
    vendors::{GenerativeModel, Mailer, SpeechSynthesizer},
};
use settings::AppConfig;
use storage::local::LocalObjectStorage;
use use_cases::{
    ai::AiHandler,
    auth::{AdminCredentials, AuthHandler},
    categories::CategoryHandler,
    contact::ContactHandler,
    gallery::GalleryHandler,
    sync::SyncHandler,
};
use vendors::{elevenlabs::ElevenLabsClient, gemini::GeminiClient, resend::ResendMailer};

/// Backing services the use cases are wired to. Vendors are `None` when unconfigured.
#[derive(Clone)]
pub struct Services {
    pub image_repo: Arc<dyn ImageRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub token_service: Arc<dyn TokenService>,
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub mailer: Option<Arc<dyn Mailer>>,
}

pub struct AppState {
    pub auth_handler: AuthHandler,
    pub gallery_handler: GalleryHandler,
    pub category_handler: CategoryHandler,
    pub sync_handler: SyncHandler,
    pub ai_handler: AiHandler,
    pub contact_handler: ContactHandler,
    pub ai_limiter: RateLimiter,
    pub contact_limiter: RateLimiter,
    pub trust_x_forwarded_for: bool,
}

impl AppState {
    /// Production wiring: Postgres repositories, local object storage and HTTP vendor clients.
    pub async fn new(config: &AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let storage = LocalObjectStorage::new(&config.storage_root, &config.public_base_url);
        storage.ensure_root().await?;

        let model = GeminiClient::from_config(&config.gemini)?
            .map(|c| Arc::new(c) as Arc<dyn GenerativeModel>);
        let speech = ElevenLabsClient::from_config(&config.elevenlabs)?
            .map(|c| Arc::new(c) as Arc<dyn SpeechSynthesizer>);
        let mailer = ResendMailer::from_config(&config.resend)?
            .map(|c| Arc::new(c) as Arc<dyn Mailer>);

        for (feature, enabled) in [
            ("AI captions and translation", model.is_some()),
            ("narration", speech.is_some()),
            ("contact email", mailer.is_some() && config.resend.to.is_some()),
        ] {
            if !enabled {
                tracing::warn!("{} disabled: vendor credentials are not configured", feature);
            }
        }

        let services = Services {
            image_repo: Arc::new(SqlxImageRepo::new(pool.clone())),
            category_repo: Arc::new(SqlxCategoryRepo::new(pool)),
            storage: Arc::new(storage),
            token_service: Arc::new(JwtService::new(config)),
            model,
            speech,
            mailer,
        };

        Ok(Self::from_services(config, services))
    }

    pub fn from_services(config: &AppConfig, services: Services) -> Self {
        let Services { image_repo, category_repo, storage, token_service, model, speech, mailer } = services;

        AppState {
            auth_handler: AuthHandler::new(
                AdminCredentials {
                    email: config.admin_email.clone(),
                    password_hash: config.admin_password_hash.clone(),
                },
                token_service.clone(),
            ),
            gallery_handler: GalleryHandler {
                image_repo: image_repo.clone(),
                category_repo: category_repo.clone(),
                storage: storage.clone(),
                model: model.clone(),
                speech: speech.clone(),
                upload_max_bytes: config.upload_max_bytes,
            },
            category_handler: CategoryHandler {
                category_repo,
                token_service,
                gallery_password_hash: config.gallery_password_hash.clone(),
            },
            sync_handler: SyncHandler { image_repo, storage },
            ai_handler: AiHandler { model, speech },
            contact_handler: ContactHandler {
                mailer,
                from: config.resend.from.clone(),
                to: config.resend.to.clone(),
            },
            ai_limiter: RateLimiter::per_minute(config.rate_limit.ai_per_minute),
            contact_limiter: RateLimiter::per_hour(config.rate_limit.contact_per_hour),
            trust_x_forwarded_for: config.rate_limit.trust_x_forwarded_for,
        }
    }

    /// Per-IP throttling for the AI proxy endpoints
    pub fn check_ai_quota(&self, req: &actix_web::HttpRequest) -> Result<(), AppError> {
        let ip = utils::get_client_ip::get_client_ip(req, self.trust_x_forwarded_for);
        self.ai_limiter.check(&ip)
    }

    pub fn check_contact_quota(&self, req: &actix_web::HttpRequest) -> Result<(), AppError> {
        let ip = utils::get_client_ip::get_client_ip(req, self.trust_x_forwarded_for);
        self.contact_limiter.check(&ip)
    }
}
