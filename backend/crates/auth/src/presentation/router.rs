//! Auth Router

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{get, post, put},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::error::AuthResult;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_bearer, short_circuit_options};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> AuthResult<Router> {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
///
/// Everything except `/health` and `/auth` sits behind the bearer gate,
/// unknown paths included. OPTIONS requests are answered before the gate.
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> AuthResult<Router>
where
    R: UserRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState::new(repo, config)?;
    let tokens = state.tokens.clone();

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth", post(handlers::authenticate::<R>))
        .route("/auth/validate", get(handlers::validate))
        .route("/auth/changepassword", put(handlers::change_password::<R>))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            require_bearer(tokens.clone(), req, next)
        }))
        .layer(middleware::from_fn(short_circuit_options))
        .with_state(state);

    Ok(router)
}
