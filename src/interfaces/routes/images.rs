use actix_web::web;

use crate::handlers::images;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/images")
            .service(
                web::resource("")
                    .route(web::get().to(images::list_images))
            )
            .service(
                web::resource("/featured")
                    .route(web::get().to(images::featured_images))
            )
            .service(
                web::resource("/{image_id}")
                    .route(web::get().to(images::get_image))
            )
            .service(
                web::resource("/{image_id}/narration")
                    .route(web::get().to(images::image_narration))
            )
    );
}
