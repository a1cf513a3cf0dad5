//! User Password Value Object
//!
//! Domain wrappers around `platform::password`.
//!
//! - [`RawPassword`]: normalized clear text from a request, zeroized when
//!   the last handle drops
//! - [`UserPassword`]: Argon2id PHC string, safe to store

use std::fmt;
use std::sync::Arc;

use platform::password::{
    ClearTextPassword, HashedPassword, HashingParams, PasswordHashError, PasswordPolicyError,
};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Cloning shares the same zeroizing buffer; the text is never copied.
#[derive(Clone)]
pub struct RawPassword(Arc<ClearTextPassword>);

impl RawPassword {
    /// Trim and check length
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        Ok(Self(Arc::new(ClearTextPassword::new(raw)?)))
    }

    pub(crate) fn shared(&self) -> Arc<ClearTextPassword> {
        Arc::clone(&self.0)
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed)
// ============================================================================

/// Stored password hash
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash off the async executor
    pub async fn from_raw(
        raw: &RawPassword,
        params: HashingParams,
    ) -> Result<Self, PasswordHashError> {
        raw.shared().hash_blocking(params).await.map(Self)
    }

    /// Restore from a stored PHC string
    pub fn from_db(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification off the async executor
    pub async fn verify(&self, raw: &RawPassword) -> Result<bool, PasswordHashError> {
        self.0.verify_blocking(raw.shared()).await
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
