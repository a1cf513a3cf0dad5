//! User Name Value Object
//!
//! The account handle presented at login and carried in tokens.
//!
//! ## Invariants
//! - Surrounding whitespace is trimmed before validation
//! - Length: 3 to 16 characters
//! - ASCII letters and digits only
//! - Case-sensitive: `Alice` and `alice` are different accounts

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 16;

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("username is required")]
    Empty,

    #[error("username must be at least {min} characters long (got {length})")]
    TooShort { length: usize, min: usize },

    #[error("username must be at most {max} characters long (got {length})")]
    TooLong { length: usize, max: usize },

    #[error("username may only contain letters and digits (found '{char}' at position {position})")]
    InvalidCharacter { char: char, position: usize },
}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Trim and validate raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let trimmed = input.as_ref().trim();
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Create from a stored value (assumes it was validated on write)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    fn validate(value: &str) -> Result<(), UserNameError> {
        if value.is_empty() {
            return Err(UserNameError::Empty);
        }

        for (position, char) in value.chars().enumerate() {
            if !char.is_ascii_alphanumeric() {
                return Err(UserNameError::InvalidCharacter { char, position });
            }
        }

        // ASCII only from here, so bytes == chars
        let length = value.len();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}
