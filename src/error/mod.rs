//! Error handling for the novelforge client.
//!
//! - **Error Categories**: high-level classification for retry decisions
//! - **Stream Errors**: the single terminal failure of a streaming session
//! - **API Errors**: failures of the request/response resource calls
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, broken body | Yes |
//! | Server | Non-success status | 5xx only |
//! | Decode | Invalid UTF-8 or JSON | No |
//! | Client | Serialization, invalid URL | No |

mod api;
mod category;
mod stream;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use stream::StreamError;

/// Result alias for the resource client.
pub type ClientResult<T> = Result<T, ApiError>;
