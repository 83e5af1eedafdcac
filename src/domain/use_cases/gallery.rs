use std::{collections::HashSet, sync::Arc};

use actix_web::web::Bytes;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        ai::DEFAULT_TARGET_LANGUAGE,
        category::Category,
        image::{
            sanitize_filename, CategoryCount, CategorySummaryResponse, GeneratedTextResponse,
            ImageChanges, ImageRecord, ImageUploadedResponse, NewImageRecord, RelabelImageRequest,
            ReviewImageRequest, UpdateImageRequest, UploadImageForm, FEATURED_LIMIT, UNCATEGORIZED,
        },
    },
    errors::AppError,
    imaging,
    repositories::{
        category::CategoryRepository,
        image::ImageRepository,
        storage::ObjectStorage,
        vendors::{GenerativeModel, SpeechSynthesizer},
    },
    use_cases::extractors::ViewerAccess,
    utils::valid_uuid::valid_uuid,
};

pub const GALLERY_PREFIX: &str = "gallery";
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// Object keys for a new upload: `gallery/{category}/{millis}-{name}` and its thumbnail.
pub fn upload_keys(category: &str, filename: &str, unix_millis: i64) -> (String, String) {
    let tail = format!("{}/{}-{}", category, unix_millis, sanitize_filename(filename));
    (
        format!("{}/{}", GALLERY_PREFIX, tail),
        format!("{}/{}", THUMBNAIL_PREFIX, tail),
    )
}

pub struct GalleryHandler {
    pub image_repo: Arc<dyn ImageRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub upload_max_bytes: usize,
}

impl GalleryHandler {
    async fn protected_slugs(&self) -> Result<HashSet<String>, AppError> {
        Ok(self
            .category_repo
            .list_categories()
            .await?
            .into_iter()
            .filter(|c| c.is_protected)
            .map(|c| c.slug)
            .collect())
    }

    async fn ensure_category_exists(&self, slug: &str) -> Result<Category, AppError> {
        self.category_repo
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::field("category", "Unknown category"))
    }

    fn model(&self) -> Result<&Arc<dyn GenerativeModel>, AppError> {
        self.model
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("AI captions are not configured".into()))
    }

    fn speech(&self) -> Result<&Arc<dyn SpeechSynthesizer>, AppError> {
        self.speech
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("Narration is not configured".into()))
    }

    fn storage_key_of(&self, image: &ImageRecord) -> Option<String> {
        image
            .storage_key
            .clone()
            .or_else(|| self.storage.key_for_url(&image.url))
    }

    // ───── Public reads ──────────────────────────────────────────────

    /// Public listing. Protected categories are hidden unless the caller may view them.
    pub async fn list_images(
        &self,
        access: &ViewerAccess,
        category: Option<&str>,
    ) -> Result<Vec<ImageRecord>, AppError> {
        let protected = self.protected_slugs().await?;

        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(slug) => {
                if protected.contains(slug) && !access.can_view(slug) {
                    return Err(AppError::ForbiddenAccess);
                }
                self.image_repo.list_by_category(slug).await
            }
            None => {
                let images = self.image_repo.list_images().await?;
                Ok(images
                    .into_iter()
                    .filter(|img| !protected.contains(&img.category) || access.can_view(&img.category))
                    .collect())
            }
        }
    }

    pub async fn featured(&self) -> Result<Vec<ImageRecord>, AppError> {
        let protected: Vec<String> = self.protected_slugs().await?.into_iter().collect();
        self.image_repo.list_recent(FEATURED_LIMIT, &protected).await
    }

    pub async fn get_image(&self, access: &ViewerAccess, id: &str) -> Result<ImageRecord, AppError> {
        let id = valid_uuid(id)?;
        let image = self.image_repo.get_image(&id).await?;

        if !access.admin && self.protected_slugs().await?.contains(&image.category) && !access.can_view(&image.category) {
            return Err(AppError::ForbiddenAccess);
        }
        Ok(image)
    }

    /// Spoken description of an image. `lang = "es"` reads the Spanish text.
    pub async fn narration(
        &self,
        access: &ViewerAccess,
        id: &str,
        lang: Option<&str>,
        voice: Option<&str>,
    ) -> Result<Bytes, AppError> {
        let speech = self.speech()?;
        let image = self.get_image(access, id).await?;

        let text = match lang.map(|l| l.trim().to_ascii_lowercase()) {
            Some(l) if l == "es" => image.description_es,
            _ => image.description,
        }
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::NotFound("Image has no description to narrate".into()))?;

        speech.synthesize(&text, voice.map(str::to_string)).await
    }

    // ───── Admin ─────────────────────────────────────────────────────

    pub async fn list_all(&self) -> Result<Vec<ImageRecord>, AppError> {
        self.image_repo.list_images().await
    }

    pub async fn upload(&self, form: UploadImageForm) -> Result<ImageUploadedResponse, AppError> {
        form.validate()?;

        if form.bytes.is_empty() {
            return Err(AppError::field("file", "File is empty"));
        }
        if form.bytes.len() > self.upload_max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Uploads are limited to {} bytes",
                self.upload_max_bytes
            )));
        }
        let mime = imaging::sniff_image_mime(&form.bytes)
            .ok_or_else(|| AppError::field("file", "Only image files are accepted"))?;

        self.ensure_category_exists(&form.category).await?;

        let (key, thumb_key) = upload_keys(&form.category, &form.filename, Utc::now().timestamp_millis());

        let thumbnail = match imaging::make_thumbnail(&form.bytes) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(key = %key, "Skipping thumbnail: {}", e);
                None
            }
        };

        let size = form.bytes.len() as i64;
        self.storage.put(&key, form.bytes, mime).await?;

        let thumbnail_url = match thumbnail {
            Some(bytes) => match self.storage.put(&thumb_key, bytes, "image/jpeg").await {
                Ok(()) => Some(self.storage.download_url(&thumb_key)?),
                Err(e) => {
                    tracing::warn!(key = %thumb_key, "Failed to store thumbnail: {}", e);
                    None
                }
            },
            None => None,
        };

        let record = NewImageRecord {
            url: self.storage.download_url(&key)?,
            thumbnail_url,
            category: form.category.clone(),
            description: Some(form.description.trim().to_string()),
            description_es: form.description_es.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            filename: form.filename,
            size,
            storage_key: Some(key.clone()),
            needs_review: false,
        };

        let id = match self.image_repo.insert_image(&record).await {
            Ok(id) => id,
            Err(e) => {
                // Leave nothing behind for the sweep to pick up
                let mut written = vec![&key];
                if record.thumbnail_url.is_some() {
                    written.push(&thumb_key);
                }
                for object in written {
                    if let Err(cleanup) = self.storage.delete(object).await {
                        tracing::warn!(key = %object, "Failed to remove object after rejected upload: {}", cleanup);
                    }
                }
                return Err(e);
            }
        };

        tracing::info!(%id, key = %key, size, "Image uploaded");

        Ok(ImageUploadedResponse {
            id,
            url: record.url,
            thumbnail_url: record.thumbnail_url,
            category: record.category,
        })
    }

    pub async fn relabel(&self, id: &str, request: RelabelImageRequest) -> Result<ImageRecord, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;
        self.ensure_category_exists(&request.category).await?;

        self.image_repo.update_category(&id, &request.category).await
    }

    pub async fn edit(&self, id: &str, request: UpdateImageRequest) -> Result<ImageRecord, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;
        let current = self.image_repo.get_image(&id).await?;

        if let Some(category) = &request.category {
            self.ensure_category_exists(category).await?;
        }

        let changes = ImageChanges {
            category: request.category.unwrap_or(current.category),
            thumbnail_url: request.thumbnail_url.normalize_blank().apply_to(current.thumbnail_url),
            description: request.description.normalize_blank().apply_to(current.description),
            description_es: request.description_es.normalize_blank().apply_to(current.description_es),
        };

        self.image_repo.update_image(&id, &changes).await
    }

    /// Files a flagged image under a real category and clears the review flag.
    pub async fn complete_review(&self, id: &str, request: ReviewImageRequest) -> Result<ImageRecord, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;
        self.ensure_category_exists(&request.category).await?;

        let image = self.image_repo.get_image(&id).await?;

        let changes = ImageChanges {
            category: request.category,
            thumbnail_url: image.thumbnail_url,
            description: Some(request.description.trim().to_string()),
            description_es: request.description_es.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        };

        let image = self.image_repo.complete_review(&id, &changes).await?;
        tracing::info!(%id, category = %image.category, "Image review completed");
        Ok(image)
    }

    /// Deletes the record. With `purge` the stored object and thumbnail go too.
    pub async fn delete(&self, id: &str, purge: bool) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        let image = self.image_repo.get_image(&id).await?;

        if purge {
            let keys = [
                self.storage_key_of(&image),
                image.thumbnail_url.as_deref().and_then(|u| self.storage.key_for_url(u)),
            ];
            for key in keys.into_iter().flatten() {
                match self.storage.delete(&key).await {
                    Ok(()) | Err(AppError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        self.image_repo.delete_image(&id).await?;
        tracing::info!(%id, purge, "Image deleted");
        Ok(())
    }

    pub async fn review_queue(&self) -> Result<Vec<ImageRecord>, AppError> {
        let known: Vec<String> = self
            .category_repo
            .list_categories()
            .await?
            .into_iter()
            .map(|c| c.slug)
            .collect();

        self.image_repo.list_needing_review(&known).await
    }

    /// Image counts per category. Labels matching no category count as uncategorized.
    pub async fn summary(&self) -> Result<CategorySummaryResponse, AppError> {
        let categories = self.category_repo.list_categories().await?;
        let counts = self.image_repo.category_counts().await?;

        let mut uncategorized = 0;
        let mut per_category: Vec<CategoryCount> = categories
            .iter()
            .map(|c| CategoryCount { slug: c.slug.clone(), name: Some(c.name.clone()), count: 0 })
            .collect();

        for (label, count) in counts {
            match per_category.iter_mut().find(|c| c.slug == label) {
                Some(entry) => entry.count += count,
                None => uncategorized += count,
            }
        }

        if uncategorized > 0 {
            per_category.push(CategoryCount { slug: UNCATEGORIZED.to_string(), name: None, count: uncategorized });
        }

        Ok(CategorySummaryResponse {
            total: per_category.iter().map(|c| c.count).sum(),
            categories: per_category,
        })
    }

    /// Captions a stored image without saving the result.
    pub async fn describe_stored(&self, id: &str) -> Result<GeneratedTextResponse, AppError> {
        let model = self.model()?;
        let id = valid_uuid(id)?;
        let image = self.image_repo.get_image(&id).await?;

        let key = self
            .storage_key_of(&image)
            .ok_or_else(|| AppError::BadRequest("Image is not held in storage".into()))?;
        let bytes = self.storage.get(&key).await?;
        let caption_image = imaging::downscale_for_caption(&bytes)?;

        let text = model.describe_image(&caption_image).await?;
        Ok(GeneratedTextResponse { id, text })
    }

    /// Translates the English description into Spanish and stores it.
    pub async fn translate_stored(&self, id: &str) -> Result<ImageRecord, AppError> {
        let model = self.model()?;
        let id = valid_uuid(id)?;
        let image = self.image_repo.get_image(&id).await?;

        let description = image
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Image has no description to translate".into()))?;

        let translated = model.translate(&description, DEFAULT_TARGET_LANGUAGE).await?;

        let changes = ImageChanges {
            category: image.category,
            thumbnail_url: image.thumbnail_url,
            description: image.description,
            description_es: Some(translated),
        };
        self.image_repo.update_image(&id, &changes).await
    }
}
