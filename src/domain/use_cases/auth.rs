use std::sync::Arc;

use validator::Validate;

use crate::auth::password::verify_password;
use crate::entities::token::{AuthResponse, LoginRequest};
use crate::errors::AuthError;
use crate::repositories::token::TokenService;

/// The single administrator configured through `ADMIN_EMAIL` / `ADMIN_PASSWORD_HASH`.
#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password_hash: String,
}

pub struct AuthHandler {
    pub admin: AdminCredentials,
    pub token_service: Arc<dyn TokenService>,
}

impl AuthHandler {
    pub fn new(admin: AdminCredentials, token_service: Arc<dyn TokenService>) -> Self {
        AuthHandler { admin, token_service }
    }

    /// Logs in the administrator and issues an access/refresh pair
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let email_matches = request.email.trim().eq_ignore_ascii_case(&self.admin.email);
        // Verify even on a wrong email so both failures take the same time
        let password_valid = verify_password(&request.password, &self.admin.password_hash)?;

        if !(email_matches && password_valid) {
            tracing::warn!("Rejected admin login");
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response()?;
        tracing::info!("Admin logged in");
        Ok(response)
    }

    fn create_auth_response(&self) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_access_token(&self.admin.email)?;
        let refresh_token = self.token_service.create_refresh_token(&self.admin.email)?;

        Ok(AuthResponse::new(access_token, refresh_token, self.token_service.access_expires_in()))
    }

    /// Issues a fresh pair for a valid refresh token
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.token_service.decode_refresh_token(token)?;

        if !claims.sub.eq_ignore_ascii_case(&self.admin.email) {
            return Err(AuthError::InvalidToken);
        }

        self.create_auth_response()
    }
}
