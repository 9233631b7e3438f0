//! Error types for the response cache
//!
//! Provides unified error handling using thiserror. Engine operations never
//! surface these to callers; they are logged at the tier boundary. The admin
//! HTTP surface is the only place they become responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the response cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid request data (oversized key or value, empty tag list)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Could not reach the shared backend
    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// The shared backend rejected or failed an operation
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A remote operation exceeded the configured timeout
    #[error("Cache operation timed out after {0} ms")]
    Timeout(u64),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Connection(_) | CacheError::Backend(_) | CacheError::Timeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Serialization(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;
