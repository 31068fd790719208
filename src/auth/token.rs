// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub role: Role,
    pub kind: TokenKind,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

/// Token service for JWT operations (HS256 with a shared secret)
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: i64,  // in seconds
    refresh_ttl: i64, // in seconds
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: access_ttl.as_secs() as i64,
            refresh_ttl: refresh_ttl.as_secs() as i64,
        }
    }

    fn issue(&self, user_id: Uuid, role: Role, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id,
            role,
            kind,
            iat: now,
            exp: now + ttl,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Generate a short-lived access token
    pub fn generate_access_token(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        self.issue(user_id, role, TokenKind::Access)
    }

    /// Generate a long-lived refresh token
    pub fn generate_refresh_token(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        self.issue(user_id, role, TokenKind::Refresh)
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        role: Role,
    ) -> Result<(String, String), AuthError> {
        let access_token = self.generate_access_token(user_id, role)?;
        let refresh_token = self.generate_refresh_token(user_id, role)?;
        Ok((access_token, refresh_token))
    }

    /// Check signature and expiry of any token
    ///
    /// Every failure (bad signature, expired, malformed) is reported as `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }

    /// Verify a token presented on a protected request; refresh tokens are refused
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Access {
            debug!("Refresh token presented as bearer credential");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
