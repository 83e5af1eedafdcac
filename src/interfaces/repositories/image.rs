use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::image::{ImageChanges, ImageRecord, NewImageRecord, UNCATEGORIZED},
    errors::AppError,
    repositories::sqlx_repo::SqlxImageRepo,
};

const IMAGE_COLUMNS: &str = "id, url, thumbnail_url, category, description, description_es, \
    filename, size, storage_key, created_at, needs_review";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn insert_image(&self, image: &NewImageRecord) -> Result<Uuid, AppError>;
    /// Inserts unless a record with the same url exists. `None` means nothing was written.
    async fn insert_if_absent(&self, image: &NewImageRecord) -> Result<Option<Uuid>, AppError>;
    async fn exists_by_url(&self, url: &str) -> Result<bool, AppError>;
    async fn get_image(&self, id: &Uuid) -> Result<ImageRecord, AppError>;
    async fn list_images(&self) -> Result<Vec<ImageRecord>, AppError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<ImageRecord>, AppError>;
    /// Newest first, skipping the given categories.
    async fn list_recent(&self, limit: u32, excluded: &[String]) -> Result<Vec<ImageRecord>, AppError>;
    /// Flagged or uncategorized images, plus those filed under a slug not in `known_slugs`.
    async fn list_needing_review(&self, known_slugs: &[String]) -> Result<Vec<ImageRecord>, AppError>;
    async fn update_category(&self, id: &Uuid, category: &str) -> Result<ImageRecord, AppError>;
    async fn update_image(&self, id: &Uuid, changes: &ImageChanges) -> Result<ImageRecord, AppError>;
    async fn complete_review(&self, id: &Uuid, changes: &ImageChanges) -> Result<ImageRecord, AppError>;
    async fn delete_image(&self, id: &Uuid) -> Result<(), AppError>;
    async fn category_counts(&self) -> Result<Vec<(String, i64)>, AppError>;
}

impl SqlxImageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxImageRepo { pool }
    }
}

#[async_trait]
impl ImageRepository for SqlxImageRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn insert_image(&self, image: &NewImageRecord) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO images (
                url, thumbnail_url, category, description, description_es,
                filename, size, storage_key, needs_review
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#
        )
        .bind(&image.url)
        .bind(&image.thumbnail_url)
        .bind(&image.category)
        .bind(&image.description)
        .bind(&image.description_es)
        .bind(&image.filename)
        .bind(image.size)
        .bind(&image.storage_key)
        .bind(image.needs_review)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("images_url_key") {
                    return AppError::Conflict("An image with this URL already exists".into());
                }
            }
            AppError::from(e)
        })?;

        Ok(id)
    }

    async fn insert_if_absent(&self, image: &NewImageRecord) -> Result<Option<Uuid>, AppError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO images (
                url, thumbnail_url, category, description, description_es,
                filename, size, storage_key, needs_review
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (url) DO NOTHING
            RETURNING id
            "#
        )
        .bind(&image.url)
        .bind(&image.thumbnail_url)
        .bind(&image.category)
        .bind(&image.description)
        .bind(&image.description_es)
        .bind(&image.filename)
        .bind(image.size)
        .bind(&image.storage_key)
        .bind(image.needs_review)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn exists_by_url(&self, url: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE url = $1)")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn get_image(&self, id: &Uuid) -> Result<ImageRecord, AppError> {
        sqlx::query_as::<_, ImageRecord>(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".into()))
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>, AppError> {
        let images = sqlx::query_as::<_, ImageRecord>(
            &format!("SELECT {IMAGE_COLUMNS} FROM images ORDER BY created_at DESC")
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<ImageRecord>, AppError> {
        let images = sqlx::query_as::<_, ImageRecord>(
            &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE category = $1 ORDER BY created_at DESC")
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn list_recent(&self, limit: u32, excluded: &[String]) -> Result<Vec<ImageRecord>, AppError> {
        let images = sqlx::query_as::<_, ImageRecord>(
            &format!(
                "SELECT {IMAGE_COLUMNS} FROM images \
                 WHERE category <> ALL($1) \
                 ORDER BY created_at DESC LIMIT $2"
            )
        )
        .bind(excluded)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn list_needing_review(&self, known_slugs: &[String]) -> Result<Vec<ImageRecord>, AppError> {
        let images = sqlx::query_as::<_, ImageRecord>(
            &format!(
                "SELECT {IMAGE_COLUMNS} FROM images \
                 WHERE needs_review = TRUE OR category = $1 OR category <> ALL($2) \
                 ORDER BY created_at DESC"
            )
        )
        .bind(UNCATEGORIZED)
        .bind(known_slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn update_category(&self, id: &Uuid, category: &str) -> Result<ImageRecord, AppError> {
        sqlx::query_as::<_, ImageRecord>(
            &format!("UPDATE images SET category = $1 WHERE id = $2 RETURNING {IMAGE_COLUMNS}")
        )
        .bind(category)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
    }

    async fn update_image(&self, id: &Uuid, changes: &ImageChanges) -> Result<ImageRecord, AppError> {
        sqlx::query_as::<_, ImageRecord>(
            &format!(
                "UPDATE images SET category = $1, description = $2, description_es = $3, \
                 thumbnail_url = $4 WHERE id = $5 RETURNING {IMAGE_COLUMNS}"
            )
        )
        .bind(&changes.category)
        .bind(&changes.description)
        .bind(&changes.description_es)
        .bind(&changes.thumbnail_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
    }

    async fn complete_review(&self, id: &Uuid, changes: &ImageChanges) -> Result<ImageRecord, AppError> {
        sqlx::query_as::<_, ImageRecord>(
            &format!(
                "UPDATE images SET category = $1, description = $2, description_es = $3, \
                 thumbnail_url = $4, needs_review = FALSE WHERE id = $5 RETURNING {IMAGE_COLUMNS}"
            )
        )
        .bind(&changes.category)
        .bind(&changes.description)
        .bind(&changes.description_es)
        .bind(&changes.thumbnail_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
    }

    async fn delete_image(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Image not found".into()));
        }

        Ok(())
    }

    async fn category_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM images GROUP BY category ORDER BY category"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
