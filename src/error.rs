//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Medium Error ==
/// Failures reported by a storage medium.
#[derive(Error, Debug)]
pub enum MediumError {
    /// The write would push total usage past the shared quota
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The backing file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds something other than a key-value map
    #[error("Storage file is corrupt: {0}")]
    Corrupt(String),
}

impl MediumError {
    /// True when the medium refused the write for lack of space.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, MediumError::QuotaExceeded { .. })
    }
}

// == Auth Error ==
/// Failure of an issuer's authentication exchange.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Issuer rejected credentials: {0}")]
    Rejected(String),

    #[error("Authentication request failed: {0}")]
    Transport(String),
}

// == Token Error ==
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Authentication with {issuer} failed: {source}")]
    Authentication {
        issuer: String,
        #[source]
        source: AuthError,
    },
}

// == Cache Error Enum ==
/// Error type for the admin HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the admin HTTP surface.
pub type Result<T> = std::result::Result<T, CacheError>;
