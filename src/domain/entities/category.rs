use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::image::UNCATEGORIZED;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_NAME_LENGTH: u64 = 60;
const MAX_SLUG_LENGTH: u64 = 60;
const MAX_ICON_LENGTH: u64 = 40;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Icon name understood by the front end, e.g. `Camera`.
    pub icon: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_protected: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CategoryInsert {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,

    #[validate(length(min = 1, max = MAX_SLUG_LENGTH), custom(function = "validate_category_slug"))]
    pub slug: String,

    #[validate(length(min = 1, max = MAX_ICON_LENGTH))]
    pub icon: String,

    pub sort_order: i32,
    pub is_protected: bool,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCategoryRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"))]
    pub name: String,

    /// Derived from `name` when absent.
    pub slug: Option<String>,

    #[validate(length(min = 1, max = MAX_ICON_LENGTH, message = "Icon must be 1-40 characters"))]
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Appended after the last category when absent.
    pub order: Option<i32>,

    #[serde(default)]
    pub is_protected: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-60 characters"))]
    pub name: Option<String>,

    pub slug: Option<String>,

    #[validate(length(min = 1, max = MAX_ICON_LENGTH, message = "Icon must be 1-40 characters"))]
    pub icon: Option<String>,

    pub order: Option<i32>,

    pub is_protected: Option<bool>,
}

/// Fully resolved update, every column carries its final value.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChanges {
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_protected: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UnlockCategoryRequest {
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockCategoryResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreatedResponse {
    pub id: Uuid,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCategoriesResponse {
    pub seeded: bool,
    pub inserted: usize,
}

fn default_icon() -> String {
    "Camera".to_string()
}

// ───── Slugs ─────────────────────────────────────────────────────────

/// Lowercases, turns whitespace runs into `-` and drops anything outside `[a-z0-9-]`.
pub fn slugify_category(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

pub fn validate_category_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug == UNCATEGORIZED {
        return Err(new_validation_error("slug_reserved", "Slug 'uncategorized' is reserved"));
    }
    Ok(())
}

pub(crate) fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

// ───── Defaults ──────────────────────────────────────────────────────

pub fn default_categories() -> Vec<CategoryInsert> {
    [
        ("Events", "events", "Camera", false),
        ("Portraits", "portraits", "Users", false),
        ("Nature", "nature", "TreePine", false),
        ("Street", "street", "Building2", false),
        ("Artistic", "artistic", "Lock", true),
    ]
    .into_iter()
    .enumerate()
    .map(|(order, (name, slug, icon, is_protected))| CategoryInsert {
        name: name.to_string(),
        slug: slug.to_string(),
        icon: icon.to_string(),
        sort_order: order as i32,
        is_protected,
    })
    .collect()
}

// ───── Conversions ──────────────────────────────────────────────────

impl CategoryInsert {
    pub fn from_request(request: NewCategoryRequest, next_order: i32) -> Self {
        let slug = match request.slug {
            Some(s) if !s.trim().is_empty() => slugify_category(&s),
            _ => slugify_category(&request.name),
        };

        CategoryInsert {
            name: request.name.trim().to_string(),
            slug,
            icon: request.icon.trim().to_string(),
            sort_order: request.order.unwrap_or(next_order),
            is_protected: request.is_protected,
        }
    }
}

impl CategoryChanges {
    /// Renaming regenerates the slug unless one is supplied explicitly.
    pub fn resolve(current: &Category, request: UpdateCategoryRequest) -> Self {
        let slug = match (&request.slug, &request.name) {
            (Some(s), _) if !s.trim().is_empty() => slugify_category(s),
            (_, Some(name)) if name.trim() != current.name => slugify_category(name),
            _ => current.slug.clone(),
        };

        CategoryChanges {
            name: request.name.map(|n| n.trim().to_string()).unwrap_or_else(|| current.name.clone()),
            slug,
            icon: request.icon.unwrap_or_else(|| current.icon.clone()),
            sort_order: request.order.unwrap_or(current.sort_order),
            is_protected: request.is_protected.unwrap_or(current.is_protected),
        }
    }
}
