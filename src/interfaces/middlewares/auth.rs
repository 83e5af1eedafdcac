use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    entities::token::{Claims, UnlockClaims},
    errors::AuthError,
    AppState,
};

const ADMIN_PREFIX: &str = "/api/v1/admin";

/// Decodes the bearer token, if any, into request extensions.
///
/// Admin tokens become `Claims`, category unlock tokens become `UnlockClaims`.
/// Requests under `/api/v1/admin` are rejected unless they carry an admin token.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let admin_route = is_admin_route(req.path()) && req.method() != actix_web::http::Method::OPTIONS;

            if let Err(e) = attach_credentials(&req) {
                if admin_route {
                    return Ok(reject(req, e));
                }
                // Public routes treat a stale or foreign token as anonymous
                tracing::debug!("Ignoring unusable bearer token: {}", e);
            }

            if admin_route {
                let is_admin = req.extensions().get::<Claims>().is_some_and(|c| c.admin);
                if !is_admin {
                    let error = if req.extensions().get::<UnlockClaims>().is_some() {
                        AuthError::Forbidden("Admin access required".into())
                    } else {
                        AuthError::MissingCredentials
                    };
                    tracing::warn!(path = %req.path(), "Admin route called without admin token");
                    return Ok(reject(req, error));
                }
            }

            service.call(req).await
        })
    }
}

fn is_admin_route(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with(&format!("{}/", ADMIN_PREFIX))
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

/// No header is fine. A header that decodes as neither token kind is an error.
fn attach_credentials(req: &ServiceRequest) -> Result<(), AuthError> {
    let Some(token) = extract_token(req) else {
        return Ok(());
    };

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState missing in middleware");
        AuthError::MissingJwtService
    })?;
    let tokens = &state.auth_handler.token_service;

    match tokens.decode_access_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(())
        }
        Err(access_err) => match tokens.decode_unlock_token(&token) {
            Ok(unlock) => {
                req.extensions_mut().insert(unlock);
                Ok(())
            }
            Err(_) => Err(access_err),
        },
    }
}

fn reject(req: ServiceRequest, error: AuthError) -> ServiceResponse<BoxBody> {
    req.into_response(error.error_response())
}
