use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{
    entities::token::{Claims, UnlockClaims},
    errors::AuthError,
};

/// Extractor for admin claims placed in the request extensions by `AuthMiddleware`.
/// Returns 403 when the token is not an admin token and 401 when no token was sent.
#[derive(Debug)]
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) if claims.admin => ready(Ok(AdminClaims(claims.clone()))),
            Some(_) => ready(Err(AuthError::Forbidden("Admin access required".into()).into())),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// What the caller of a public gallery endpoint may see. Never rejects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerAccess {
    pub admin: bool,
    /// Slug of the protected category unlocked by the caller's token.
    pub unlocked: Option<String>,
}

impl ViewerAccess {
    pub fn anonymous() -> Self {
        ViewerAccess::default()
    }

    pub fn admin() -> Self {
        ViewerAccess { admin: true, unlocked: None }
    }

    pub fn unlocked(slug: impl Into<String>) -> Self {
        ViewerAccess { admin: false, unlocked: Some(slug.into()) }
    }

    pub fn can_view(&self, slug: &str) -> bool {
        self.admin || self.unlocked.as_deref() == Some(slug)
    }
}

impl FromRequest for ViewerAccess {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        let access = if extensions.get::<Claims>().is_some_and(|c| c.admin) {
            ViewerAccess::admin()
        } else if let Some(unlock) = extensions.get::<UnlockClaims>() {
            ViewerAccess::unlocked(unlock.sub.clone())
        } else {
            ViewerAccess::anonymous()
        };
        ready(Ok(access))
    }
}
