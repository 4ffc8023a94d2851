//! HTTP error responses.
//!
//! Every failure a handler or extractor can produce is an [`ApiError`], and
//! every `ApiError` maps to exactly one status code and the JSON body
//! `{"success": false, "error": <status>, "message": <text>}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StoreError;
use crate::types::InvalidDrink;

/// Message sent for every 500. Details go to the log only.
const INTERNAL_MESSAGE: &str = "internal server error";

/// A failed request, rendered as the JSON error envelope.
///
/// The `Display` text is the client-facing `message`, except for 500s which
/// always send a fixed message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token verification or permission failure (401, 403, or 500 when the
    /// key set is unavailable).
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Missing or invalid request body.
    #[error("{0}")]
    BadRequest(String),
    /// Unknown drink id or route.
    #[error("resource not found")]
    NotFound,
    /// Known route, unsupported method.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// The drink store failed.
    #[error("internal server error")]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: u16,
    message: &'a str,
}

impl ApiError {
    /// A 400 carrying `message`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status this error is sent with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::PermissionDenied) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::KeySetFetch(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<InvalidDrink> for ApiError {
    fn from(error: InvalidDrink) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Debug output keeps the underlying sqlx/reqwest error for the log.
            tracing::error!(error = ?self, "request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: &message,
        };
        (status, Json(body)).into_response()
    }
}
