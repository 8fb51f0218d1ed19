//! Errors for the request/response resource calls.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Error type for non-streaming client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request or response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body was not valid UTF-8
    #[error("Response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ApiError {
    /// High-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Http(HttpError::InvalidUrl(_)) => ErrorCategory::Client,
            ApiError::Http(_) => ErrorCategory::Network,
            ApiError::ServerError { .. } | ApiError::NotFound(_) => ErrorCategory::Server,
            ApiError::Json(_) | ApiError::Utf8(_) => ErrorCategory::Decode,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServerError { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            ApiError::Http(HttpError::ServerError { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
