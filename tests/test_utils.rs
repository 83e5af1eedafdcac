#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use gallery_backend::{
    auth::{jwt::JwtService, password::hash_password},
    entities::token::AuthResponse,
    middlewares::auth::AuthMiddleware,
    repositories::vendors::{GenerativeModel, Mailer, SpeechSynthesizer},
    routes::{configure_extractors, configure_routes},
    settings::{AppConfig, AppEnvironment, RateLimitConfig, ResendConfig},
    storage::local::LocalObjectStorage,
    AppState, Services,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::{net::TcpListener, sync::Arc, time::Duration};
use tempfile::TempDir;

use crate::test_fixtures::{FakeModel, FakeSpeech, InMemoryCategoryRepo, InMemoryImageRepo, RecordingMailer};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "CorrectHorseBattery1!";
pub const GALLERY_PASSWORD: &str = "open-sesame";

const BOUNDARY: &str = "----gallery-test-boundary";

pub struct TestOptions {
    pub with_vendors: bool,
    pub ai_per_minute: u64,
    pub contact_per_hour: u64,
    pub upload_max_bytes: Option<usize>,
}

impl Default for TestOptions {
    fn default() -> Self {
        TestOptions { with_vendors: true, ai_per_minute: 100, contact_per_hour: 100, upload_max_bytes: None }
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub images: Arc<InMemoryImageRepo>,
    pub categories: Arc<InMemoryCategoryRepo>,
    pub storage: Arc<LocalObjectStorage>,
    pub mailer: Arc<RecordingMailer>,
    _storage_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let storage_dir = tempfile::tempdir().unwrap();
        let config = test_config(&address, &storage_dir, &options);

        let images = Arc::new(InMemoryImageRepo::default());
        let categories = Arc::new(InMemoryCategoryRepo::default());
        let storage = Arc::new(LocalObjectStorage::new(storage_dir.path(), &address));
        storage.ensure_root().await.unwrap();
        let mailer = Arc::new(RecordingMailer::default());

        let (model, speech, mail) = if options.with_vendors {
            (
                Some(Arc::new(FakeModel) as Arc<dyn GenerativeModel>),
                Some(Arc::new(FakeSpeech) as Arc<dyn SpeechSynthesizer>),
                Some(mailer.clone() as Arc<dyn Mailer>),
            )
        } else {
            (None, None, None)
        };

        let services = Services {
            image_repo: images.clone(),
            category_repo: categories.clone(),
            storage: storage.clone(),
            token_service: Arc::new(JwtService::new(&config)),
            model,
            speech,
            mailer: mail,
        };
        let state = web::Data::new(AppState::from_services(&config, services));

        let server_state = state.clone();
        let json_limit = config.json_limit_bytes;
        let upload_limit = config.upload_max_bytes;
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .configure(configure_extractors(json_limit, upload_limit))
                .wrap(AuthMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        TestApp {
            state,
            address,
            client,
            config,
            images,
            categories,
            storage,
            mailer,
            _storage_dir: storage_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn admin_token(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "admin login failed");

        let auth: AuthResponse = response.json().await.unwrap();
        auth.access_token
    }

    pub async fn seed_categories(&self, token: &str) {
        let response = self
            .client
            .post(self.url("/api/v1/admin/categories/seed"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn upload(&self, token: &str, category: &str, description: &str, filename: &str, bytes: &[u8]) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/admin/images"))
            .bearer_auth(token)
            .header("Content-Type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(multipart_body(category, description, filename, bytes))
            .send()
            .await
            .unwrap()
    }
}

fn multipart_body(category: &str, description: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [("category", category), ("description", description)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\
                 Content-Type: text/plain\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn test_config(address: &str, storage_dir: &TempDir, options: &TestOptions) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        upload_max_bytes: options.upload_max_bytes.unwrap_or(defaults.upload_max_bytes),
        env: AppEnvironment::Testing,
        name: "Gallery API Test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        worker_count: 1,
        database_url: "postgres://unused".into(),
        public_base_url: address.to_string(),
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        refresh_token_secret: "test_refresh_secret_that_is_long_enough_1234567890".into(),
        admin_email: ADMIN_EMAIL.into(),
        admin_password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
        gallery_password_hash: Some(hash_password(GALLERY_PASSWORD).unwrap()),
        storage_root: storage_dir.path().to_string_lossy().into_owned(),
        rate_limit: RateLimitConfig {
            ai_per_minute: options.ai_per_minute,
            contact_per_hour: options.contact_per_hour,
            trust_x_forwarded_for: false,
        },
        resend: ResendConfig {
            to: Some("studio@example.com".into()),
            ..Default::default()
        },
        ..defaults
    }
}
