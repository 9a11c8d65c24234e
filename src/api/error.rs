//! Mapping of store failures onto HTTP responses, and server errors.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::core::StoreError;

/// Body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Request failure, split into caller mistakes and storage problems
#[derive(Debug)]
pub enum ApiError {
    NoText,
    Database(StoreError),
    /// Body could not be received; answered with axum's own status
    Body(JsonRejection),
}

/// Failure of the HTTP server as a whole
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("HTTP server error: {0}")]
    Http(#[from] std::io::Error),

    #[error("Failed to close content store: {0}")]
    Store(#[from] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_client_error() {
            Self::NoText
        } else {
            Self::Database(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoText => (StatusCode::BAD_REQUEST, "No text provided"),
            Self::Database(err) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            Self::Body(rejection) => {
                error!("Failed to read request body: {}", rejection);
                return rejection.into_response();
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_io_failure_is_not_a_storage_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = ServeError::from(io);

        assert!(matches!(err, ServeError::Http(_)));
        assert!(err.to_string().starts_with("HTTP server error"));
    }

    #[test]
    fn test_close_failure_keeps_store_error() {
        let err = ServeError::from(StoreError::unavailable("disk gone"));

        assert!(matches!(err, ServeError::Store(StoreError::Unavailable(_))));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NoText.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::unavailable("x")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
