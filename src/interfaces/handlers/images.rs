use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::image::{ImageListQuery, NarrationQuery},
    errors::AppError,
    use_cases::extractors::ViewerAccess,
    AppState,
};

pub(crate) const AUDIO_MPEG: &str = "audio/mpeg";

#[instrument(skip(access, state, query))]
pub async fn list_images(
    access: ViewerAccess,
    state: web::Data<AppState>,
    query: web::Query<ImageListQuery>,
) -> Result<impl Responder, AppError> {
    let images = state
        .gallery_handler
        .list_images(&access, query.category.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(images))
}

#[instrument(skip(state))]
pub async fn featured_images(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let images = state.gallery_handler.featured().await?;
    Ok(HttpResponse::Ok().json(images))
}

#[instrument(skip(access, image_id, state))]
pub async fn get_image(
    access: ViewerAccess,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let image = state.gallery_handler.get_image(&access, &image_id).await?;
    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(req, access, image_id, state, query))]
pub async fn image_narration(
    req: HttpRequest,
    access: ViewerAccess,
    image_id: web::Path<String>,
    state: web::Data<AppState>,
    query: web::Query<NarrationQuery>,
) -> Result<impl Responder, AppError> {
    state.check_ai_quota(&req)?;

    let audio = state
        .gallery_handler
        .narration(&access, &image_id, query.lang.as_deref(), query.voice.as_deref())
        .await?;

    Ok(HttpResponse::Ok().content_type(AUDIO_MPEG).body(audio))
}
