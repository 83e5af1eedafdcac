use std::sync::Arc;

use validator::{Validate, ValidationErrors};

use crate::{
    auth::password::verify_password,
    entities::category::{
        default_categories, validate_category_slug, Category, CategoryChanges, CategoryCreatedResponse,
        CategoryInsert, NewCategoryRequest, SeedCategoriesResponse, UnlockCategoryRequest,
        UnlockCategoryResponse, UpdateCategoryRequest,
    },
    errors::{AppError, AuthError},
    repositories::{category::CategoryRepository, token::TokenService},
    utils::valid_uuid::valid_uuid,
};

pub struct CategoryHandler {
    pub category_repo: Arc<dyn CategoryRepository>,
    pub token_service: Arc<dyn TokenService>,
    /// Argon2 hash shared by every protected category.
    pub gallery_password_hash: Option<String>,
}

impl CategoryHandler {
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list_categories().await
    }

    async fn ensure_slug_free(&self, slug: &str, exclude_id: Option<uuid::Uuid>) -> Result<(), AppError> {
        if self.category_repo.slug_exists(slug, exclude_id).await? {
            return Err(AppError::Conflict(format!("Category slug '{}' already exists", slug)));
        }
        Ok(())
    }

    pub async fn create_category(&self, request: NewCategoryRequest) -> Result<CategoryCreatedResponse, AppError> {
        request.validate()?;

        let next_order = self.category_repo.max_sort_order().await?.map_or(0, |max| max + 1);
        let insert = CategoryInsert::from_request(request, next_order);
        insert.validate()?;

        self.ensure_slug_free(&insert.slug, None).await?;
        let id = self.category_repo.insert_category(&insert).await?;

        tracing::info!(%id, slug = %insert.slug, "Category created");
        Ok(CategoryCreatedResponse { id, slug: insert.slug })
    }

    /// Images keep their old label when a slug changes and show up in the review queue.
    pub async fn update_category(&self, id: &str, request: UpdateCategoryRequest) -> Result<Category, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;
        let current = self.category_repo.get_category(&id).await?;

        let changes = CategoryChanges::resolve(&current, request);
        if let Err(e) = validate_category_slug(&changes.slug) {
            let mut errors = ValidationErrors::new();
            errors.add("slug", e);
            return Err(errors.into());
        }
        if changes.slug != current.slug {
            self.ensure_slug_free(&changes.slug, Some(id)).await?;
        }

        self.category_repo.update_category(&id, &changes).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.category_repo.delete_category(&id).await?;
        tracing::info!(%id, "Category deleted");
        Ok(())
    }

    /// Inserts the default categories when none exist yet.
    pub async fn seed_defaults(&self) -> Result<SeedCategoriesResponse, AppError> {
        if self.category_repo.count_categories().await? > 0 {
            return Ok(SeedCategoriesResponse { seeded: false, inserted: 0 });
        }

        let defaults = default_categories();
        for category in &defaults {
            self.category_repo.insert_category(category).await?;
        }

        tracing::info!(count = defaults.len(), "Seeded default categories");
        Ok(SeedCategoriesResponse { seeded: true, inserted: defaults.len() })
    }

    /// Exchanges the gallery password for a token scoped to one protected category.
    pub async fn unlock(&self, slug: &str, request: UnlockCategoryRequest) -> Result<UnlockCategoryResponse, AppError> {
        request.validate()?;

        let category = self
            .category_repo
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

        if !category.is_protected {
            return Err(AppError::BadRequest("Category is not protected".into()));
        }

        let hash = self
            .gallery_password_hash
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable("Protected galleries are not configured".into()))?;

        if !verify_password(&request.password, hash)? {
            tracing::warn!(slug, "Rejected gallery password");
            return Err(AuthError::WrongCredentials.into());
        }

        let access_token = self.token_service.create_unlock_token(&category.slug)?;

        Ok(UnlockCategoryResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.unlock_expires_in(),
            category: category.slug,
        })
    }
}
