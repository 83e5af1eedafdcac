use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::image::{
        DeleteImageQuery, ImageUpload, RelabelImageRequest, ReviewImageRequest, UpdateImageRequest,
    },
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

#[instrument(skip(_claims, state))]
pub async fn list_all_images(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let images = state.gallery_handler.list_all().await?;
    Ok(HttpResponse::Ok().json(images))
}

#[instrument(skip(_claims, state))]
pub async fn review_queue(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let images = state.gallery_handler.review_queue().await?;
    Ok(HttpResponse::Ok().json(images))
}

#[instrument(skip(_claims, state))]
pub async fn category_summary(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let summary = state.gallery_handler.summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[instrument(skip(_claims, state, form))]
pub async fn upload_image(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ImageUpload>,
) -> Result<impl Responder, AppError> {
    let form = form.into_form().await?;
    let response = state.gallery_handler.upload(form).await?;

    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(_claims, image_id, state, data))]
pub async fn edit_image(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateImageRequest>,
) -> Result<impl Responder, AppError> {
    let image = state.gallery_handler.edit(&image_id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(_claims, image_id, state, data))]
pub async fn relabel_image(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<RelabelImageRequest>,
) -> Result<impl Responder, AppError> {
    let image = state.gallery_handler.relabel(&image_id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(_claims, image_id, state, data))]
pub async fn complete_review(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ReviewImageRequest>,
) -> Result<impl Responder, AppError> {
    let image = state
        .gallery_handler
        .complete_review(&image_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(image))
}

/// Suggests a caption for a stored image without saving it.
#[instrument(skip(_claims, image_id, state))]
pub async fn describe_image(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let suggestion = state.gallery_handler.describe_stored(&image_id).await?;
    Ok(HttpResponse::Ok().json(suggestion))
}

#[instrument(skip(_claims, image_id, state))]
pub async fn translate_image(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let image = state.gallery_handler.translate_stored(&image_id).await?;
    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(_claims, image_id, state, query))]
pub async fn delete_image(
    _claims: AdminClaims,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
    query: web::Query<DeleteImageQuery>,
) -> Result<impl Responder, AppError> {
    state.gallery_handler.delete(&image_id, query.purge).await?;
    Ok(HttpResponse::NoContent().finish())
}
