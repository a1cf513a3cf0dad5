//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::error::Error as StdError;
use std::fmt::Display;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldError, kind::ErrorKind};
use platform::password::PasswordHashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Body could not be decoded as JSON or form data
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Known user, wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, badly signed or expired
    #[error("Missing or invalid bearer token")]
    TokenInvalid,

    /// Unknown user that is not on the allow-list
    #[error("User is not allowed to register")]
    NotAllowed,

    /// Password change targets an account other than the token subject
    #[error("Token subject does not match the target account")]
    SubjectMismatch,

    #[error("User not found")]
    UserNotFound,

    /// User name already taken
    #[error("User already exists")]
    DuplicateUser,

    /// Credential store failure
    #[error("{operation} failed for {subject}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        subject: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Wrap a store error with the operation and the subject it concerned
    pub fn store<E>(operation: &'static str, subject: impl Display) -> impl FnOnce(E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let subject = subject.to_string();
        move |source| AuthError::StoreUnavailable {
            operation,
            subject,
            source: Box::new(source),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::NotAllowed | AuthError::SubjectMismatch => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::StoreUnavailable { .. } | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::MalformedBody(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::TokenInvalid => ErrorKind::Unauthorized,
            AuthError::NotAllowed | AuthError::SubjectMismatch => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::DuplicateUser => ErrorKind::Conflict,
            AuthError::StoreUnavailable { .. } | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::Validation(errors) => err.with_field_errors(errors.clone()),
            AuthError::TokenInvalid => {
                err.with_action("Sign in again to obtain a new token")
            }
            AuthError::DuplicateUser => err.with_action("Sign in with the existing account"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::StoreUnavailable {
                operation,
                subject,
                source,
            } => {
                tracing::error!(%operation, %subject, error = %source, "Credential store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SubjectMismatch => {
                tracing::warn!("Password change attempted for another account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let challenge = matches!(self, AuthError::TokenInvalid);
        let mut response = self.to_app_error().into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AuthError::Validation(vec![]), 422),
            (AuthError::MalformedBody("eof".into()), 400),
            (AuthError::InvalidCredentials, 401),
            (AuthError::TokenInvalid, 401),
            (AuthError::NotAllowed, 403),
            (AuthError::SubjectMismatch, 403),
            (AuthError::UserNotFound, 404),
            (AuthError::DuplicateUser, 409),
            (AuthError::Internal("boom".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
            assert_eq!(err.to_app_error().status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_store_error_context() {
        let io = std::io::Error::other("connection refused");
        let err = AuthError::store("lookup_user", "alice")(io);
        assert_eq!(err.to_string(), "lookup_user failed for alice: connection refused");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_validation_carries_field_errors() {
        let err = AuthError::Validation(vec![FieldError::body("username", "required")]);
        let app = err.to_app_error();
        assert_eq!(app.field_errors().len(), 1);
        assert_eq!(app.field_errors()[0].field, "username");
    }

    #[test]
    fn test_token_invalid_sets_challenge() {
        let response = AuthError::TokenInvalid.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
