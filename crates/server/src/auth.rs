//! Bearer-token validation for WebSocket connects.
//!
//! The connect request carries `Authorization: Bearer <JWT>`; the token is
//! validated against an HMAC key supplied as base64. A connection that
//! fails validation is rejected before any session state exists.
//!
//! When no secret is configured the authenticator runs open and resolves
//! every connection to the `anonymous` identity — useful for local
//! development, loudly logged at startup.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identity attached to connections without a configured secret.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Claims carried by accepted tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier.
    pub sub: String,
    /// Optional e-mail claim.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional role claim.
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

/// The identity resolved at connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Option<String>,
}

/// Errors surfaced when a connection cannot be authenticated.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingToken,
    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Validates bearer tokens with an HMAC key.
pub struct JwtAuthenticator {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Build from a base64-encoded HMAC secret. `None` (or empty) leaves
    /// the authenticator open and every connection anonymous.
    pub fn from_base64_secret(
        secret: Option<&str>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = match secret.filter(|s| !s.trim().is_empty()) {
            Some(secret) => Some(DecodingKey::from_base64_secret(secret.trim())?),
            None => {
                warn!("no JWT secret configured; WebSocket connections are anonymous");
                None
            }
        };
        Ok(Self {
            key,
            validation: Validation::new(Algorithm::HS256),
        })
    }

    /// Whether tokens are actually being validated.
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Resolve the `Authorization` header of a connect request.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let Some(key) = &self.key else {
            return Ok(AuthenticatedUser {
                user_id: ANONYMOUS_USER.to_string(),
                role: None,
            });
        };

        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(token, key, &self.validation)?;
        debug!(user = %data.claims.sub, "WebSocket connection authenticated");

        Ok(AuthenticatedUser {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}
