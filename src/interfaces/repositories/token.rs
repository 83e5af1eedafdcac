use crate::{
    entities::token::{Claims, RefreshClaims, UnlockClaims},
    errors::AuthError,
};

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Access token for the gallery administrator
    fn create_access_token(&self, email: &str) -> Result<String, AuthError>;

    fn create_refresh_token(&self, email: &str) -> Result<String, AuthError>;

    /// Token granting read access to one protected category
    fn create_unlock_token(&self, category_slug: &str) -> Result<String, AuthError>;

    fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError>;

    fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError>;

    fn decode_unlock_token(&self, token: &str) -> Result<UnlockClaims, AuthError>;

    /// Lifetime of access tokens in seconds
    fn access_expires_in(&self) -> i64;

    fn unlock_expires_in(&self) -> i64;
}
