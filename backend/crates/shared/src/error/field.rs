//! Field-level validation errors
//!
//! Carried by [`AppError`](super::app_error::AppError) for 422 responses so
//! the client learns which input failed and why.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// One failed input field.
///
/// The offending value is deliberately not part of this type: password
/// fields must never be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request field name as the client sent it (e.g. `newPassword`)
    pub field: Cow<'static, str>,
    /// Human readable reason
    pub message: Cow<'static, str>,
    /// Where the field was read from
    pub location: &'static str,
}

impl FieldError {
    /// Error for a field read from the request body
    pub fn body(field: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            location: "body",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
