//! One streaming call: byte source, decode state, line state, lifecycle.

use std::collections::VecDeque;
use std::fmt;

use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::decoder::Utf8Decoder;
use super::frame::{extract_event, LineAssembler};
use crate::error::StreamError;
use crate::traits::{ByteStream, Headers, HttpClient};

/// Lifecycle of a [`StreamSession`].
///
/// `Idle -> Requesting -> Streaming -> {Completed | Failed}`, with
/// `Requesting -> Failed` on a bad initial response. `Cancelled` is entered
/// when the owner closes the session early. Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateful, single-use context for one streaming call.
///
/// The session owns its byte source. Events are pulled with
/// [`next_event`](Self::next_event): each call returns the next complete
/// `data:` payload, reading more chunks only when no complete frame is queued.
/// At most one `Err` is ever returned, after which the session yields `None`.
pub struct StreamSession {
    source: Option<ByteStream>,
    decoder: Utf8Decoder,
    lines: LineAssembler,
    ready: VecDeque<String>,
    state: SessionState,
    chunks_read: usize,
    bytes_read: usize,
    events_emitted: usize,
    /// Decode failure to report once the frames before it are delivered.
    deferred: Option<StreamError>,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("state", &self.state)
            .field("chunks_read", &self.chunks_read)
            .field("bytes_read", &self.bytes_read)
            .field("events_emitted", &self.events_emitted)
            .field("ready", &self.ready.len())
            .finish()
    }
}

impl StreamSession {
    /// Create an idle session with no byte source yet.
    pub fn new() -> Self {
        Self {
            source: None,
            decoder: Utf8Decoder::new(),
            lines: LineAssembler::new(),
            ready: VecDeque::new(),
            state: SessionState::Idle,
            chunks_read: 0,
            bytes_read: 0,
            events_emitted: 0,
            deferred: None,
        }
    }

    /// Create a session already streaming from `source`.
    pub fn from_source(source: ByteStream) -> Self {
        let mut session = Self::new();
        session.source = Some(source);
        session.state = SessionState::Streaming;
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn events_emitted(&self) -> usize {
        self.events_emitted
    }

    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }

    /// Issue the streaming request and take ownership of its body.
    ///
    /// Only valid from `Idle`. On failure the session is `Failed` and the
    /// error is returned for the caller to report; nothing was read.
    pub async fn open<C, B>(
        &mut self,
        client: &C,
        url: &str,
        body: &B,
        headers: &Headers,
    ) -> Result<(), StreamError>
    where
        C: HttpClient + ?Sized,
        B: Serialize + ?Sized,
    {
        if self.state != SessionState::Idle {
            return Err(StreamError::Setup(crate::traits::HttpError::Other(format!(
                "session cannot be opened from state {}",
                self.state
            ))));
        }
        self.state = SessionState::Requesting;

        let body = match serde_json::to_string(body) {
            Ok(body) => body,
            Err(e) => {
                return Err(self.fail(StreamError::Serialize {
                    message: e.to_string(),
                }))
            }
        };

        debug!(url, "opening stream");
        match client.post_stream(url, &body, headers).await {
            Ok(source) => {
                self.source = Some(source);
                self.state = SessionState::Streaming;
                info!(url, "stream opened");
                Ok(())
            }
            Err(e) => Err(self.fail(StreamError::from_setup(e))),
        }
    }

    /// Pull the next event payload.
    ///
    /// Returns `None` once the session is terminal and every completed frame
    /// has been handed out.
    pub async fn next_event(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            while let Some(frame) = self.ready.pop_front() {
                match extract_event(&frame) {
                    Some(payload) => {
                        self.events_emitted += 1;
                        return Some(Ok(payload));
                    }
                    None => trace!(frame = %frame, "discarding non-event frame"),
                }
            }

            if let Some(err) = self.deferred.take() {
                return Some(Err(self.fail(err)));
            }
            if self.state != SessionState::Streaming {
                return None;
            }
            let source = self.source.as_mut()?;

            match source.next().await {
                Some(Ok(chunk)) => {
                    self.chunks_read += 1;
                    self.bytes_read += chunk.len();
                    let decoded = self.decoder.decode(&chunk);
                    let frames = self.lines.push(&decoded.text);
                    trace!(
                        chunk = self.chunks_read,
                        len = chunk.len(),
                        frames = frames.len(),
                        "chunk received"
                    );
                    self.ready.extend(frames);
                    // Lines completed before the bad byte still go out first
                    self.deferred = decoded.error;
                }
                Some(Err(e)) => return Some(Err(self.fail(StreamError::Read(e)))),
                None => {
                    if let Err(e) = self.decoder.finish() {
                        return Some(Err(self.fail(e)));
                    }
                    if let Some(tail) = self.lines.finish() {
                        debug!("flushing unterminated final frame");
                        self.ready.push_back(tail);
                    }
                    self.terminate(SessionState::Completed);
                    info!(
                        chunks = self.chunks_read,
                        bytes = self.bytes_read,
                        "stream completed"
                    );
                }
            }
        }
    }

    /// Close the session early. No further events are produced.
    pub fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.ready.clear();
        self.lines.clear();
        self.terminate(SessionState::Cancelled);
        debug!(events = self.events_emitted, "stream cancelled");
    }

    /// Stop reading because the consumer has everything it needs.
    pub fn stop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.ready.clear();
        self.lines.clear();
        self.terminate(SessionState::Completed);
    }

    fn fail(&mut self, err: StreamError) -> StreamError {
        warn!(
            code = err.error_code(),
            state = %self.state,
            events = self.events_emitted,
            "stream failed: {}",
            err
        );
        self.ready.clear();
        self.lines.clear();
        self.terminate(SessionState::Failed);
        err
    }

    fn terminate(&mut self, state: SessionState) {
        // Dropping the source releases the connection.
        self.source = None;
        self.deferred = None;
        self.state = state;
    }
}
