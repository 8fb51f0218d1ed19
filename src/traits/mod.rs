//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, PUT, DELETE, streaming)
//! - [`EventSink`] - Consumer side of a streaming session

pub mod http;
pub mod sink;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use sink::{CallbackSink, EventSink, RecordingSink};
