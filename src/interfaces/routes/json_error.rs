use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{errors::AppError, handlers::json_error::JsonError};

pub fn config_routes(cfg: &mut web::ServiceConfig, json_limit: usize, upload_limit: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(|err, _req| JsonError::from(err).into()),
    );
    cfg.app_data(
        web::QueryConfig::default().error_handler(|err, _req| JsonError::from(err).into()),
    );
    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(upload_limit + 64 * 1024)
            .error_handler(|err, _req| AppError::from(err).into()),
    );
}
