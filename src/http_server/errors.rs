//! # HTTP API Errors
//!
//! Every handler error becomes `{"error": "...", "code": N}` with the
//! matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::reviews::ReviewError;
use crate::table_store::StoreError;
use crate::text::TextError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing required parameter or body field
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Query parameter present but unparseable
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Body is not the JSON object we expect
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Input rejected by a domain rule; the message is shown as is
    #[error("{0}")]
    Validation(String),

    /// Requested page larger than the configured cap
    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    /// Lookup by key matched nothing
    #[error("{0}")]
    NotFound(String),

    /// Lookup by key matched more than one row
    #[error("{0}")]
    Conflict(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The remote store failed
    #[error("Upstream store error: {0}")]
    Store(StoreError),

    /// Failure reported as a plain internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::LimitExceeded(_, _) => StatusCode::BAD_REQUEST,

            // 404 / 409
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,

            // 5xx
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Invalid(msg) => ApiError::Validation(msg),
            ReviewError::LimitExceeded(requested, cap) => ApiError::LimitExceeded(requested, cap),
            ReviewError::AmbiguousIsbn { .. } => ApiError::Conflict(err.to_string()),
            ReviewError::Store(store) => ApiError::Store(store),
        }
    }
}

impl From<TextError> for ApiError {
    fn from(err: TextError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
