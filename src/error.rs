//! Error types for the feed cache service
//!
//! Cache failures, source-of-truth failures and the user-facing error are kept
//! apart so that only the last one can ever reach an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failure talking to the cache store.
///
/// Always recovered inside [`crate::feed::FeedCache`]: reads become misses and
/// writes become no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The store did not answer within the configured timeout
    #[error("cache {0} timed out")]
    Timeout(&'static str),

    /// The stored blob could not be encoded or decoded
    #[error("cache serialization failed: {0}")]
    Serialization(String),

    /// The store itself reported a failure
    #[error("cache store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == Source Error Enum ==
/// Failure reported by the source of truth.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The addressed record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The store could not be reached or failed mid-query
    #[error("source of truth unavailable: {0}")]
    Unavailable(String),
}

// == Feed Error Enum ==
/// Error surfaced to callers of the feed service.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested post or reply does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Neither the cache nor the source of truth could answer
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl From<SourceError> for FeedError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(what) => FeedError::NotFound(what),
            SourceError::Unavailable(msg) => FeedError::Unavailable(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match &self {
            FeedError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FeedError::NotFound(_) => StatusCode::NOT_FOUND,
            FeedError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the feed service.
pub type Result<T> = std::result::Result<T, FeedError>;
