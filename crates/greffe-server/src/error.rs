//! HTTP error mapping.
//!
//! One error type for the whole admin surface; every failure renders as
//! `{ok: false, error}` with the matching status code. Authorization
//! failures are produced by the middleware before any handler runs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::certify::CertifyError;
use crate::store::StoreError;

/// Errors surfaced by the admin HTTP API.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing or malformed bearer token")]
    Unauthorized,

    #[error("Admin role required")]
    Forbidden,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Precondition(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "admin API failure");
        }
        let body = Json(serde_json::json!({
            "ok": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<CertifyError> for AppError {
    fn from(e: CertifyError) -> Self {
        match e {
            CertifyError::NotFound(what) => AppError::NotFound(what),
            CertifyError::Precondition(why) => AppError::Precondition(why),
            CertifyError::Malformed(why) => AppError::Internal(why),
            CertifyError::Store(inner) => AppError::Internal(inner.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Backend(why) => AppError::Internal(why),
        }
    }
}
