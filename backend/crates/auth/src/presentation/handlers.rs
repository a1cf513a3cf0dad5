//! HTTP Handlers

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::Json;
use kernel::error::app_error::AppError;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::{Claims, TokenIssuer};
use crate::application::{
    AuthenticateInput, AuthenticateUseCase, ChangePasswordInput, ChangePasswordUseCase,
    CredentialStore,
};
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{AuthRequest, ChangePasswordRequest, TokenResponse};
use crate::presentation::extract::JsonOrForm;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenIssuer>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig) -> AuthResult<Self> {
        let tokens = TokenIssuer::new(&config)?;
        Ok(Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        })
    }

    fn store(&self) -> CredentialStore<R> {
        CredentialStore::new(self.repo.clone(), self.config.hashing)
    }
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ============================================================================
// Authenticate
// ============================================================================

/// POST /auth
pub async fn authenticate<R>(
    State(state): State<AuthAppState<R>>,
    JsonOrForm(req): JsonOrForm<AuthRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    let use_case = AuthenticateUseCase::new(state.store(), state.tokens.clone());

    let output = use_case
        .execute(AuthenticateInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(TokenResponse {
        token: output.token,
    }))
}

// ============================================================================
// Token Validation
// ============================================================================

/// GET /auth/validate
///
/// The bearer gate has already done the work; reaching here means the
/// token is valid.
pub async fn validate(Extension(claims): Extension<Claims>) -> StatusCode {
    tracing::debug!(user_name = %claims.username, "Token validated");
    StatusCode::OK
}

// ============================================================================
// Change Password
// ============================================================================

/// PUT /auth/changepassword
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<Claims>,
    JsonOrForm(req): JsonOrForm<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        ChangePasswordUseCase::new(state.store(), state.config.bind_password_change_to_subject);

    use_case
        .execute(
            ChangePasswordInput {
                username: req.username,
                new_password: req.new_password,
            },
            &claims,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Fallback
// ============================================================================

pub async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}
