use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::category::{NewCategoryRequest, UnlockCategoryRequest, UpdateCategoryRequest},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_categories(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.category_handler.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[instrument(skip(slug, state, data))]
pub async fn unlock_category(
    slug: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UnlockCategoryRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.category_handler.unlock(&slug, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_category(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewCategoryRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.category_handler.create_category(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(_claims, category_id, state, data))]
pub async fn update_category(
    _claims: AdminClaims,
    category_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateCategoryRequest>,
) -> Result<impl Responder, AppError> {
    let category = state
        .category_handler
        .update_category(&category_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(_claims, category_id, state))]
pub async fn delete_category(
    _claims: AdminClaims,
    category_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.category_handler.delete_category(&category_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
pub async fn seed_categories(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.category_handler.seed_defaults().await?;
    Ok(HttpResponse::Ok().json(response))
}
