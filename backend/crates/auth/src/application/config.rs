//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::password::HashingParams;

/// Signing secret used when none is configured (development only)
pub const DEVELOPMENT_JWT_SECRET: &str = "secret-password";

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for HS512 token signatures
    pub jwt_secret: String,
    /// Token lifetime
    pub token_ttl: Duration,
    /// Opaque payload copied into every token's `context` claim
    pub token_context: serde_json::Value,
    /// Argon2id cost for new hashes
    pub hashing: HashingParams,
    /// Reject password changes for accounts other than the token subject
    pub bind_password_change_to_subject: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            token_context: serde_json::Value::Object(Default::default()),
            hashing: HashingParams::default(),
            bind_password_change_to_subject: true,
        }
    }
}

impl AuthConfig {
    /// Create config with the given signing secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Whether the development fallback secret is in use
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("token_context", &"[REDACTED]")
            .field("hashing", &self.hashing)
            .field(
                "bind_password_change_to_subject",
                &self.bind_password_change_to_subject,
            )
            .finish()
    }
}
