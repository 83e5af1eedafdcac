use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::category::{Category, CategoryChanges, CategoryInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxCategoryRepo,
};

const CATEGORY_COLUMNS: &str = "id, name, slug, icon, sort_order, is_protected, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn get_category(&self, id: &Uuid) -> Result<Category, AppError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError>;
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError>;
    async fn insert_category(&self, category: &CategoryInsert) -> Result<Uuid, AppError>;
    async fn update_category(&self, id: &Uuid, changes: &CategoryChanges) -> Result<Category, AppError>;
    async fn delete_category(&self, id: &Uuid) -> Result<(), AppError>;
    async fn count_categories(&self) -> Result<i64, AppError>;
    async fn max_sort_order(&self) -> Result<Option<i32>, AppError>;
}

impl SqlxCategoryRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxCategoryRepo { pool }
    }
}

fn map_slug_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("categories_slug_key") {
            return AppError::Conflict("Category slug already exists".into());
        }
    }
    AppError::from(e)
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order ASC, created_at ASC")
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get_category(&self, id: &Uuid) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1")
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM categories
                WHERE slug = $1
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_category(&self, category: &CategoryInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO categories (name, slug, icon, sort_order, is_protected)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.icon)
        .bind(category.sort_order)
        .bind(category.is_protected)
        .fetch_one(&self.pool)
        .await
        .map_err(map_slug_conflict)?;

        Ok(id)
    }

    async fn update_category(&self, id: &Uuid, changes: &CategoryChanges) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            &format!(
                "UPDATE categories SET name = $1, slug = $2, icon = $3, sort_order = $4, is_protected = $5 \
                 WHERE id = $6 RETURNING {CATEGORY_COLUMNS}"
            )
        )
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.icon)
        .bind(changes.sort_order)
        .bind(changes.is_protected)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_slug_conflict)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    async fn delete_category(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".into()));
        }

        Ok(())
    }

    async fn count_categories(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn max_sort_order(&self) -> Result<Option<i32>, AppError> {
        let max: Option<i32> = sqlx::query_scalar("SELECT MAX(sort_order) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }
}
