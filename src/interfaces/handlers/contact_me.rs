use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::contact_me::ContactMeForm, errors::AppError, AppState};

#[instrument(skip(req, state, form))]
pub async fn send_contact_message(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactMeForm>,
) -> Result<impl Responder, AppError> {
    state.check_contact_quota(&req)?;

    let response = state.contact_handler.send_message(form.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
