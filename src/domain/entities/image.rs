use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        category::{new_validation_error, validate_category_slug},
        option_fields::PatchString,
    },
    errors::AppError,
};

/// Category assigned to records discovered by the reconciliation sweep,
/// and the bucket orphaned category labels are folded into.
pub const UNCATEGORIZED: &str = "uncategorized";

pub const FEATURED_LIMIT: u32 = 5;

const MAX_DESCRIPTION_LENGTH: u64 = 5000;
const MAX_FILENAME_LENGTH: u64 = 255;
const MAX_URL_LENGTH: u64 = 2048;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: Uuid,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub description_es: Option<String>,
    pub filename: String,
    pub size: i64,
    pub storage_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub needs_review: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImageRecord {
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub description_es: Option<String>,
    pub filename: String,
    pub size: i64,
    pub storage_key: Option<String>,
    pub needs_review: bool,
}

impl NewImageRecord {
    /// Record for an object found in storage without a matching database entry.
    pub fn discovered(url: String, storage_key: &str, size: u64) -> Self {
        let filename = storage_key
            .rsplit('/')
            .next()
            .unwrap_or(storage_key)
            .to_string();

        NewImageRecord {
            url,
            thumbnail_url: None,
            category: UNCATEGORIZED.to_string(),
            description: Some(String::new()),
            description_es: None,
            filename,
            size: size as i64,
            storage_key: Some(storage_key.to_string()),
            needs_review: true,
        }
    }
}

/// Fully resolved edit, every column carries its final value.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageChanges {
    pub category: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub description_es: Option<String>,
}

// ───── Input & Validation Requests ──────────────────────────────────

/// Raw `multipart/form-data` body of an admin upload.
#[derive(Debug, MultipartForm)]
pub struct ImageUpload {
    /// Bounded by `MultipartFormConfig::total_limit`, which follows `upload_max_bytes`.
    pub file: TempFile,

    pub category: Text<String>,

    pub description: Text<String>,

    #[multipart(rename = "descriptionEs")]
    pub description_es: Option<Text<String>>,
}

impl ImageUpload {
    /// Reads the spooled file back and flattens the text fields.
    pub async fn into_form(self) -> Result<UploadImageForm, AppError> {
        let bytes = tokio::fs::read(self.file.file.path()).await?;
        let filename = self
            .file
            .file_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "image".to_string());

        Ok(UploadImageForm {
            category: self.category.into_inner().trim().to_string(),
            description: self.description.into_inner(),
            description_es: self.description_es.map(Text::into_inner),
            filename,
            bytes,
        })
    }
}

/// Multipart upload after the form fields have been collected.
#[derive(Debug, Validate)]
pub struct UploadImageForm {
    #[validate(custom(function = "validate_assignable_category"))]
    pub category: String,

    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH, message = "Description is required"))]
    pub description: String,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description_es: Option<String>,

    #[validate(length(min = 1, max = MAX_FILENAME_LENGTH, message = "File name is required"))]
    pub filename: String,

    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RelabelImageRequest {
    #[validate(custom(function = "validate_assignable_category"))]
    pub category: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[validate(custom(function = "validate_optional_category"))]
    pub category: Option<String>,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: PatchString,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description_es: PatchString,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_patch_url"))]
    pub thumbnail_url: PatchString,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImageRequest {
    #[validate(custom(function = "validate_assignable_category"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description_es: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteImageQuery {
    #[serde(default)]
    pub purge: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NarrationQuery {
    pub lang: Option<String>,
    pub voice: Option<String>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadedResponse {
    pub id: Uuid,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub slug: String,
    pub name: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummaryResponse {
    pub total: i64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTextResponse {
    pub id: Uuid,
    pub text: String,
}

/// Outcome of a storage reconciliation sweep.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub total: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

// ───── Validation Helpers ───────────────────────────────────────────

/// A category an image may be filed under: a valid slug other than the sweep bucket.
pub fn validate_assignable_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(new_validation_error("category_empty", "Category is required"));
    }
    validate_category_slug(category)
}

pub fn validate_optional_category(category: &String) -> Result<(), ValidationError> {
    validate_assignable_category(category)
}

pub fn validate_patch_url(value: &PatchString) -> Result<(), ValidationError> {
    match value {
        PatchString::SetToValue(url) if !url.trim().is_empty() => url::Url::parse(url.trim())
            .map(|_| ())
            .map_err(|_| new_validation_error("invalid_url", "Thumbnail must be an absolute URL")),
        _ => Ok(()),
    }
}

/// Keeps the trailing file name and replaces anything unsafe for a storage key.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovered_records_need_review() {
        let record = NewImageRecord::discovered(
            "http://localhost/media/gallery/old/shot.jpg".into(),
            "gallery/old/shot.jpg",
            2048,
        );

        assert_eq!(record.category, UNCATEGORIZED);
        assert!(record.needs_review);
        assert_eq!(record.filename, "shot.jpg");
        assert_eq!(record.size, 2048);
    }

    #[test]
    fn review_requires_a_real_category() {
        let uncategorized = ReviewImageRequest {
            category: UNCATEGORIZED.into(),
            description: String::new(),
            description_es: None,
        };
        let blank = ReviewImageRequest {
            category: "  ".into(),
            description: String::new(),
            description_es: None,
        };
        let filed = ReviewImageRequest {
            category: "portraits".into(),
            description: "A quiet look".into(),
            description_es: None,
        };

        assert!(uncategorized.validate().is_err());
        assert!(blank.validate().is_err());
        assert!(filed.validate().is_ok());
    }

    #[test]
    fn upload_requires_description() {
        let form = UploadImageForm {
            category: "nature".into(),
            description: String::new(),
            description_es: None,
            filename: "fern.jpg".into(),
            bytes: vec![1, 2, 3],
        };

        assert!(form.validate().is_err());
    }

    #[test]
    fn thumbnail_patch_must_be_absolute_url() {
        let relative = UpdateImageRequest {
            thumbnail_url: PatchString::SetToValue("thumbs/a.jpg".into()),
            ..Default::default()
        };
        let absolute = UpdateImageRequest {
            thumbnail_url: PatchString::SetToValue("https://cdn.example.com/t/a.jpg".into()),
            ..Default::default()
        };
        let cleared = UpdateImageRequest { thumbnail_url: PatchString::SetToNull, ..Default::default() };

        assert!(relative.validate().is_err());
        assert!(absolute.validate().is_ok());
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn sanitize_filename_strips_paths_and_symbols() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\my shot (1).JPG"), "my_shot__1_.JPG");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("///"), "image");
    }

    #[test]
    fn record_serializes_in_camel_case() {
        let record = ImageRecord {
            id: Uuid::new_v4(),
            url: "u".into(),
            thumbnail_url: None,
            category: "nature".into(),
            description: None,
            description_es: Some("Hola".into()),
            filename: "f.jpg".into(),
            size: 1,
            storage_key: None,
            created_at: Utc::now(),
            needs_review: false,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["descriptionEs"], "Hola");
        assert_eq!(json["needsReview"], false);
    }
}
