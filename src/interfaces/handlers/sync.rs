use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AdminClaims, AppState};

/// Registers stored objects that have no database record.
#[instrument(skip(_claims, state))]
pub async fn run_sync(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let report = state.sync_handler.run_sweep().await?;
    Ok(HttpResponse::Ok().json(report))
}
