use actix_web::{get, http::header, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, AppState};

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Serves stored objects by key. Keys embed an upload timestamp, so responses are cached for good.
#[get("/media/{key:.*}")]
#[instrument(skip(key, state))]
pub async fn get_media(
    key: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let bytes = state.gallery_handler.storage.get(&key).await?;
    let content_type = content_type_for(&key, &bytes);

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, CACHE_CONTROL))
        .body(bytes))
}

fn content_type_for(key: &str, bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type();
    }

    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
