//! Consumer side of a streaming session.

use crate::error::StreamError;

/// Receives the events of one streaming session.
///
/// `on_event` is called once per event, in arrival order, synchronously
/// between chunk reads. `on_error` is called at most once and nothing is
/// delivered after it. Implementors that do not override `on_error` still get
/// failures recorded through `tracing`.
pub trait EventSink: Send {
    /// Handle one event payload.
    fn on_event(&mut self, payload: String);

    /// Checked after every event; returning `false` ends the session as
    /// completed without reading further.
    fn wants_more(&self) -> bool {
        true
    }

    /// Handle the terminal failure of the session.
    fn on_error(&mut self, err: StreamError) {
        tracing::error!(
            code = err.error_code(),
            category = %err.category(),
            "stream failed with no error handler: {}",
            err
        );
    }
}

/// Adapts a pair of closures to [`EventSink`].
///
/// A `None` error callback falls back to the default `tracing` report.
pub struct CallbackSink<E, F>
where
    E: FnMut(String) + Send,
    F: FnMut(StreamError) + Send,
{
    on_event: E,
    on_error: Option<F>,
}

impl<E, F> CallbackSink<E, F>
where
    E: FnMut(String) + Send,
    F: FnMut(StreamError) + Send,
{
    pub fn new(on_event: E, on_error: Option<F>) -> Self {
        Self { on_event, on_error }
    }
}

impl<E, F> EventSink for CallbackSink<E, F>
where
    E: FnMut(String) + Send,
    F: FnMut(StreamError) + Send,
{
    fn on_event(&mut self, payload: String) {
        (self.on_event)(payload)
    }

    fn on_error(&mut self, err: StreamError) {
        match self.on_error.as_mut() {
            Some(handler) => handler(err),
            None => tracing::error!(
                code = err.error_code(),
                category = %err.category(),
                "stream failed with no error handler: {}",
                err
            ),
        }
    }
}

/// Collects everything a session delivers. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
    pub errors: Vec<StreamError>,
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, payload: String) {
        self.events.push(payload);
    }

    fn on_error(&mut self, err: StreamError) {
        self.errors.push(err);
    }
}
