// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{ranking::RankError, store::StoreError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    // 400, non-positive or non-numeric page/limit
    #[error("invalid pagination parameter: {0}")]
    InvalidPaginationParameter(String),

    // 400
    #[error("bad request: {0}")]
    BadRequest(String),

    // 401
    #[error("unauthorized: {0}")]
    AuthError(String),

    // 403, e.g. second exam edit on the same day
    #[error("forbidden: {0}")]
    Forbidden(String),

    // 404
    #[error("not found: {0}")]
    NotFound(String),

    // 500, the store read failed or timed out
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailure(String),

    // 500
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Machine-readable error kind, included in every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidPaginationParameter(_) => "invalid_pagination_parameter",
            AppError::BadRequest(_) => "bad_request",
            AppError::AuthError(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::UpstreamFetchFailure(_) => "upstream_fetch_failure",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }
}

/// Converts the error into a JSON `{ error, kind }` body with the matching status.
/// Server-side details are logged, not returned.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match self {
            AppError::InvalidPaginationParameter(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpstreamFetchFailure(msg) => {
                tracing::error!("Upstream fetch failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data".to_string(),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

impl From<RankError> for AppError {
    fn from(err: RankError) -> Self {
        AppError::InvalidPaginationParameter(err.to_string())
    }
}

/// Allows using `?` on store calls.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::UpstreamFetchFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_errors_are_client_errors() {
        let err: AppError = crate::ranking::PageRequest::new(0, 5).unwrap_err().into();
        assert_eq!(err.kind(), "invalid_pagination_parameter");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_are_server_errors() {
        let err: AppError = StoreError::Unavailable("connection reset".to_string()).into();
        assert_eq!(err.kind(), "upstream_fetch_failure");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
