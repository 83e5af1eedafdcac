use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, Header, Validation};
use serde::de::DeserializeOwned;

use crate::entities::token::{Claims, RefreshClaims, TokenType, UnlockClaims};
use crate::errors::AuthError;
use crate::repositories::token::TokenService;
use crate::settings::{AppConfig, JwtKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    refresh_expiration: Duration,
    unlock_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            refresh_expiration: Duration::days(config.refresh_token_exp_days),
            unlock_expiration: Duration::minutes(config.unlock_token_minutes),
        }
    }

    fn sign<T: serde::Serialize>(&self, claims: &T, refresh: bool) -> Result<String, AuthError> {
        let key = if refresh { &self.keys.refresh_encoding } else { &self.keys.encoding };
        encode(&Header::new(JWT_ALGORITHM), claims, key).map_err(|e| {
            tracing::warn!("Failed to sign token: {}", e);
            AuthError::TokenCreation
        })
    }

    fn verify<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<T, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<T>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::from)
    }
}

fn expect_type(actual: TokenType, expected: TokenType) -> Result<(), AuthError> {
    if actual == expected {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

impl TokenService for JwtService {
    fn create_access_token(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: email.to_string(),
            email: email.to_string(),
            admin: true,
            token_type: TokenType::Access,
            exp: (now + self.access_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        self.sign(&claims, false)
    }

    fn create_refresh_token(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = RefreshClaims {
            sub: email.to_string(),
            token_type: TokenType::Refresh,
            exp: (now + self.refresh_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        self.sign(&claims, true)
    }

    fn create_unlock_token(&self, category_slug: &str) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = UnlockClaims {
            sub: category_slug.to_string(),
            token_type: TokenType::Unlock,
            exp: (now + self.unlock_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        self.sign(&claims, false)
    }

    fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims: Claims = self.verify(token, &self.keys.decoding)?;
        expect_type(claims.token_type, TokenType::Access)?;
        Ok(claims)
    }

    fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims: RefreshClaims = self.verify(token, &self.keys.refresh_decoding)?;
        expect_type(claims.token_type, TokenType::Refresh)?;
        Ok(claims)
    }

    fn decode_unlock_token(&self, token: &str) -> Result<UnlockClaims, AuthError> {
        let claims: UnlockClaims = self.verify(token, &self.keys.decoding)?;
        expect_type(claims.token_type, TokenType::Unlock)?;
        Ok(claims)
    }

    fn access_expires_in(&self) -> i64 {
        self.access_expiration.num_seconds()
    }

    fn unlock_expires_in(&self) -> i64 {
        self.unlock_expiration.num_seconds()
    }
}
