//! Micetro API client error types

use ipamflow_core::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Connection-level failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

impl From<ApiError> for TransportError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Http(e) if e.is_timeout() => TransportError::Timeout(e.to_string()),
            ApiError::Http(e) if e.is_decode() => TransportError::Decode(e.to_string()),
            ApiError::Json(e) => TransportError::Decode(e.to_string()),
            other => TransportError::Connection(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
