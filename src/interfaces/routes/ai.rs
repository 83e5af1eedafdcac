use actix_web::web;

use crate::handlers::ai;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .route("/describe", web::post().to(ai::describe))
            .route("/translate", web::post().to(ai::translate))
            .route("/narrate", web::post().to(ai::narrate))
    );
}
