//! novelforge - client for a novel-writing content service with a streaming
//! AI assistant.
//!
//! The core is [`sse`]: an incremental reader that turns a chunked HTTP body
//! into `data:` event payloads, delivered in order, with exactly one error
//! notification on failure. [`client`] covers the request/response resource
//! calls for novels, chapters and conversations.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sse;
pub mod traits;

pub use client::NovelForgeClient;
pub use config::ClientConfig;
pub use error::{ApiError, ClientResult, StreamError};
pub use sse::{SessionState, StreamEventReader};
