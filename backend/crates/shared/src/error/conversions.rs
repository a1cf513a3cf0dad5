//! Error conversions
//!
//! Rendering of [`AppError`] as an HTTP response.

use super::app_error::AppError;

// ============================================================================
// Problem details
// ============================================================================

/// RFC 7807 problem details body for an error.
///
/// 5xx details are replaced by the generic reason phrase; the real message
/// belongs in the logs.
pub fn problem_details(err: &AppError) -> serde_json::Value {
    let detail = if err.is_server_error() {
        err.kind().as_str()
    } else {
        err.message()
    };

    let mut body = serde_json::json!({
        "type": format!("https://httpstatuses.io/{}", err.status_code()),
        "title": err.kind().as_str(),
        "status": err.status_code(),
        "detail": detail,
        "action": err.action(),
    });

    if !err.field_errors().is_empty() {
        body["errors"] = serde_json::json!(err.field_errors());
    }

    body
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem_details(&self))).into_response()
    }
}
