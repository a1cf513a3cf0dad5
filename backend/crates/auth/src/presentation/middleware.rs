//! Auth Middleware
//!
//! Bearer token gate for protected routes, and the preflight short-circuit
//! that runs in front of it.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::token::TokenIssuer;
use crate::error::AuthError;

/// Paths reachable without a token
pub const PUBLIC_PATHS: &[&str] = &["/auth", "/health"];

/// Answer every OPTIONS request with an empty 200
pub async fn short_circuit_options(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

/// Middleware that requires a valid bearer token outside [`PUBLIC_PATHS`]
///
/// Validated claims are stored in the request extensions.
pub async fn require_bearer(
    tokens: Arc<TokenIssuer>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        tracing::debug!(path = %req.uri().path(), "Missing bearer token");
        return Err(AuthError::TokenInvalid.into_response());
    };

    let claims = tokens
        .validate(token)
        .map_err(IntoResponse::into_response)?;

    tracing::debug!(user_name = %claims.username, path = %req.uri().path(), "Bearer token accepted");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
