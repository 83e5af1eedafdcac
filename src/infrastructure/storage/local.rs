use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::{
    errors::AppError,
    repositories::storage::{ObjectStorage, StoredObject},
};

const MEDIA_PREFIX: &str = "media";

/// Filesystem-backed object store. Objects are published under `{public_base_url}/media/{key}`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    media_base: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        LocalObjectStorage {
            root: root.into(),
            media_base: format!("{}/{}/", public_base_url.trim_end_matches('/'), MEDIA_PREFIX),
        }
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn key_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

/// Keys are relative `/`-separated paths without empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), AppError> {
    let valid = !key.is_empty()
        && !key.contains('\\')
        && key.split('/').all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid storage key: {}", key)))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn check(&self) -> Result<(), AppError> {
        let metadata = fs::metadata(&self.root).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(AppError::InternalError("Storage root is not a directory".into()))
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write beside the target and rename so readers never see partial files
        let tmp = path.with_file_name(format!(".{}.part", Uuid::new_v4()));
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(key, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;
        Ok(fs::read(path).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        fs::remove_file(path).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<StoredObject>, AppError> {
        let prefix = prefix.trim_matches('/');
        let start = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix)?
        };

        let mut objects = Vec::new();
        let mut pending = vec![start];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    if recursive {
                        pending.push(entry.path());
                    }
                } else if file_type.is_file() {
                    if let Some(key) = self.key_of(&entry.path()) {
                        let size = entry.metadata().await?.len();
                        objects.push(StoredObject { key, size });
                    }
                }
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn download_url(&self, key: &str) -> Result<String, AppError> {
        validate_key(key)?;
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!("{}{}", self.media_base, encoded))
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let encoded = url.strip_prefix(&self.media_base)?;
        let key = encoded
            .split('/')
            .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
            .collect::<Option<Vec<_>>>()?
            .join("/");
        validate_key(&key).ok().map(|_| key)
    }
}
