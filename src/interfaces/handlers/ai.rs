use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::ai::{DescribeImageRequest, NarrateRequest, TranslateRequest},
    errors::AppError,
    handlers::images::AUDIO_MPEG,
    AppState,
};

#[instrument(skip(req, state, data))]
pub async fn describe(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<DescribeImageRequest>,
) -> Result<impl Responder, AppError> {
    state.check_ai_quota(&req)?;

    let response = state.ai_handler.describe(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(req, state, data))]
pub async fn translate(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<TranslateRequest>,
) -> Result<impl Responder, AppError> {
    state.check_ai_quota(&req)?;

    let response = state.ai_handler.translate(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(req, state, data))]
pub async fn narrate(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<NarrateRequest>,
) -> Result<impl Responder, AppError> {
    state.check_ai_quota(&req)?;

    let audio = state.ai_handler.narrate(data.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type(AUDIO_MPEG).body(audio))
}
