use async_trait::async_trait;

use crate::errors::AppError;

/// Object listed from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
}

/// Flat key/value blob store with public download URLs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn check(&self) -> Result<(), AppError>;
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
    /// Objects under `prefix` (empty for the root). Non-recursive listing skips nested folders.
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<StoredObject>, AppError>;
    /// Public URL the object can be fetched from.
    fn download_url(&self, key: &str) -> Result<String, AppError>;
    /// Reverse of `download_url`, `None` for foreign URLs.
    fn key_for_url(&self, url: &str) -> Option<String>;
}
