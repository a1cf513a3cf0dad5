//! Request Body Extraction
//!
//! Credential endpoints accept either a JSON or a form-urlencoded body,
//! picked by `Content-Type`. A body without a content type is parsed as
//! JSON, and an empty one yields `T::default()`.

use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Json, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::AuthError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// JSON or form body
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        match content_type {
            Some(ct) if ct.starts_with(FORM_CONTENT_TYPE) => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| AuthError::MalformedBody(e.body_text()))?;
                Ok(Self(value))
            }
            Some(_) => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| AuthError::MalformedBody(e.body_text()))?;
                Ok(Self(value))
            }
            None => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AuthError::MalformedBody(e.body_text()))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self(T::default()));
                }
                serde_json::from_slice(&bytes)
                    .map(Self)
                    .map_err(|e| AuthError::MalformedBody(e.to_string()))
            }
        }
    }
}
