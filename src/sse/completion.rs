//! Interpretation of chat-completion payloads relayed over the stream.
//!
//! The assistant backend forwards either raw completion chunks
//! (`{"choices":[{"delta":{"content":"..."}}]}`) terminated by `[DONE]`, or
//! already-extracted plain text. Both shapes are accepted here.

use serde::Deserialize;

use crate::error::StreamError;
use crate::traits::EventSink;

/// End-of-answer sentinel.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a single event payload means to a text consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    /// A piece of assistant text from a completion chunk.
    Delta(String),
    /// Plain text that is not a completion chunk.
    Text(String),
    /// The answer is finished.
    Done,
    /// A chunk carrying no text (role announcement, finish reason, keep-alive).
    Ignored,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Classify an event payload.
pub fn parse_completion_payload(payload: &str) -> CompletionPayload {
    let trimmed = payload.trim();
    if trimmed == DONE_SENTINEL {
        return CompletionPayload::Done;
    }
    if !trimmed.starts_with('{') {
        return CompletionPayload::Text(payload.to_string());
    }

    match serde_json::from_str::<CompletionChunk>(trimmed) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
            .map(CompletionPayload::Delta)
            .unwrap_or(CompletionPayload::Ignored),
        Err(e) => {
            tracing::debug!("ignoring unparseable completion chunk: {}", e);
            CompletionPayload::Ignored
        }
    }
}

/// Wraps a sink so it only sees assistant text and stops at `[DONE]`.
pub struct TextSink<S: EventSink> {
    inner: S,
    done: bool,
}

impl<S: EventSink> TextSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, done: false }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for TextSink<S> {
    fn on_event(&mut self, payload: String) {
        match parse_completion_payload(&payload) {
            CompletionPayload::Delta(text) | CompletionPayload::Text(text) => {
                self.inner.on_event(text)
            }
            CompletionPayload::Done => self.done = true,
            CompletionPayload::Ignored => {}
        }
    }

    fn wants_more(&self) -> bool {
        !self.done && self.inner.wants_more()
    }

    fn on_error(&mut self, err: StreamError) {
        self.inner.on_error(err)
    }
}
