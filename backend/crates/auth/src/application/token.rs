//! Bearer Tokens
//!
//! HS512-signed JWTs carrying the user identity and the configured context
//! payload. Only HS512 is accepted on validation, and expiry is checked
//! with zero leeway.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub id: UserId,
    /// Subject user name
    pub username: String,
    /// Opaque payload for downstream services
    pub context: serde_json::Value,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Issues and validates bearer tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    context: serde_json::Value,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let ttl = chrono::Duration::from_std(config.token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid token TTL: {e}")))?;

        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked by hand so tests can pin the clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl,
            context: config.token_context.clone(),
        })
    }

    /// Issue a token valid from now
    pub fn issue(&self, user_id: &UserId, user_name: &UserName) -> AuthResult<String> {
        self.issue_at(user_id, user_name, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &UserId,
        user_name: &UserName,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("Token expiry out of range".to_string()))?;

        let claims = Claims {
            id: *user_id,
            username: user_name.as_str().to_string(),
            context: self.context.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token against the current time
    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::TokenInvalid
            })?
            .claims;

        if claims.exp <= now.timestamp() {
            tracing::debug!(user_name = %claims.username, exp = claims.exp, "Token expired");
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
