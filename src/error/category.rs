//! Error category classification.
//!
//! Categories let callers decide on retry policy and messaging without
//! matching on every concrete error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, or a body read that broke off.
    /// Generally transient and retryable.
    Network,

    /// The service answered with a non-success status.
    /// 5xx is worth retrying, 4xx usually is not.
    Server,

    /// Bytes arrived but could not be turned into text or JSON.
    Decode,

    /// Programming errors on the client side (serialization, invalid URL).
    Client,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Client => "client",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Decode => "Malformed data from server",
            ErrorCategory::Client => "Application error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
