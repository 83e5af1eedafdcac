use actix_web::web;

use crate::handlers::{admin_images, categories, sync};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::scope("/images")
                    .service(
                        web::resource("")
                            .route(web::get().to(admin_images::list_all_images))
                            .route(web::post().to(admin_images::upload_image))
                    )
                    .service(
                        web::resource("/review")
                            .route(web::get().to(admin_images::review_queue))
                    )
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(admin_images::category_summary))
                    )
                    .service(
                        web::resource("/{image_id}")
                            .route(web::patch().to(admin_images::edit_image))
                            .route(web::delete().to(admin_images::delete_image))
                    )
                    .service(
                        web::resource("/{image_id}/category")
                            .route(web::put().to(admin_images::relabel_image))
                    )
                    .service(
                        web::resource("/{image_id}/review")
                            .route(web::post().to(admin_images::complete_review))
                    )
                    .service(
                        web::resource("/{image_id}/describe")
                            .route(web::post().to(admin_images::describe_image))
                    )
                    .service(
                        web::resource("/{image_id}/translate")
                            .route(web::post().to(admin_images::translate_image))
                    )
            )
            .service(
                web::scope("/categories")
                    .service(
                        web::resource("")
                            .route(web::post().to(categories::create_category))
                    )
                    .service(
                        web::resource("/seed")
                            .route(web::post().to(categories::seed_categories))
                    )
                    .service(
                        web::resource("/{category_id}")
                            .route(web::patch().to(categories::update_category))
                            .route(web::delete().to(categories::delete_category))
                    )
            )
            .service(
                web::resource("/sync")
                    .route(web::post().to(sync::run_sync))
            )
    );
}
