//! API DTOs (Data Transfer Objects)
//!
//! Fields are optional so that missing values surface as field-level
//! validation errors rather than body decoding failures.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Authenticate
// ============================================================================

/// POST /auth request
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// POST /auth response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Change Password
// ============================================================================

/// PUT /auth/changepassword request
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub username: Option<String>,
    pub new_password: Option<String>,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("username", &self.username)
            .field(
                "new_password",
                &self.new_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_field_names() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"username":"alice","newPassword":"pw34"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.new_password.as_deref(), Some("pw34"));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let req: AuthRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_none() && req.password.is_none());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let req = AuthRequest {
            username: Some("alice".into()),
            password: Some("hunter22".into()),
        };
        let out = format!("{req:?}");
        assert!(out.contains("alice"));
        assert!(!out.contains("hunter22"));
    }
}
