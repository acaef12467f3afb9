//! HTTP Error Types
//!
//! Maps application errors to HTTP responses. Storage details are logged,
//! never sent to the client.

use crate::types::ClaimResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coupon_core::error::AppError;
use thiserror::Error;

/// Handler-level error
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self.0, status = status.as_u16(), "Claim request failed");
        (status, Json(ClaimResponse::failure("Internal server error"))).into_response()
    }
}

/// Server lifecycle errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failure_is_5xx() {
        let err = ApiError(AppError::Database("disk I/O error".to_string()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.status().is_server_error());

        let err = ApiError(AppError::Internal("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
