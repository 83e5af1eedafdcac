use actix_web::web;

use crate::handlers::{home::home, media::get_media, system::health_check};

mod admin;
mod ai;
mod auth;
mod categories;
mod contact;
mod images;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(get_media);

    cfg.service(
        web::scope("/api/v1")
            .service(health_check)
            .configure(auth::config_routes)
            .configure(categories::config_routes)
            .configure(images::config_routes)
            .configure(ai::config_routes)
            .configure(contact::config_routes)
            .configure(admin::config_routes)
    );
}

/// Body limits and error rendering for the JSON, query and multipart extractors.
pub fn configure_extractors(json_limit: usize, upload_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| json_error::config_routes(cfg, json_limit, upload_limit)
}
