//! Streaming-related error types.
//!
//! [`StreamError`] is the single value handed to a session's error sink. It
//! covers both failures before streaming begins and failures mid-stream.

use std::fmt;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Errors terminating a streaming session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The streaming request could not be issued.
    Setup(HttpError),

    /// The service answered with a non-success status before any bytes streamed.
    Status {
        status: u16,
        message: String,
    },

    /// The byte source failed after streaming started.
    Read(HttpError),

    /// The bytes received were not valid UTF-8.
    Decode {
        message: String,
    },

    /// The request body could not be serialized.
    Serialize {
        message: String,
    },
}

impl StreamError {
    /// Build the error for a failed streaming request, splitting out status failures.
    pub fn from_setup(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::Status { status, message },
            other => StreamError::Setup(other),
        }
    }

    /// High-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Setup(HttpError::InvalidUrl(_)) => ErrorCategory::Client,
            StreamError::Setup(_) | StreamError::Read(_) => ErrorCategory::Network,
            StreamError::Status { .. } => ErrorCategory::Server,
            StreamError::Decode { .. } => ErrorCategory::Decode,
            StreamError::Serialize { .. } => ErrorCategory::Client,
        }
    }

    /// True when the error happened before the first byte was read.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            StreamError::Setup(_) | StreamError::Status { .. } | StreamError::Serialize { .. }
        )
    }

    /// Check if this error is likely transient and the caller may retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Status { status, .. } => *status >= 500,
            other => other.category().is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Setup(_) => "Could not reach the assistant. Please try again.".to_string(),
            StreamError::Status { status, .. } => {
                format!("The assistant refused the request (HTTP {}).", status)
            }
            StreamError::Read(_) => {
                "Connection to the assistant was lost mid-response.".to_string()
            }
            StreamError::Decode { .. } => {
                "Received invalid text from the assistant.".to_string()
            }
            StreamError::Serialize { .. } => "Could not prepare the request.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Setup(_) => "E_STREAM_SETUP",
            StreamError::Status { .. } => "E_STREAM_STATUS",
            StreamError::Read(_) => "E_STREAM_READ",
            StreamError::Decode { .. } => "E_STREAM_DECODE",
            StreamError::Serialize { .. } => "E_STREAM_SERIALIZE",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Setup(e) => write!(f, "Stream request failed: {}", e),
            StreamError::Status { status, message } => {
                write!(f, "Stream request rejected ({}): {}", status, message)
            }
            StreamError::Read(e) => write!(f, "Stream read failed: {}", e),
            StreamError::Decode { message } => write!(f, "Stream decode failed: {}", message),
            StreamError::Serialize { message } => {
                write!(f, "Stream request serialization failed: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Setup(e) | StreamError::Read(e) => Some(e),
            _ => None,
        }
    }
}
