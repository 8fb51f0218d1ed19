//! Streaming event reader: opens a session per prompt and dispatches events.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use futures::stream::{self, Stream};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::completion::TextSink;
use super::session::{SessionState, StreamSession};
use crate::error::StreamError;
use crate::models::AiRequest;
use crate::traits::{CallbackSink, EventSink, Headers, HttpClient};

/// Lazily produced events of one session. Finite and not restartable.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

/// Consumes the streaming AI endpoint.
///
/// Every call opens its own [`StreamSession`]; concurrent calls share only
/// the HTTP client.
///
/// # Example
///
/// ```ignore
/// let reader = client.stream_reader();
/// let outcome = reader
///     .consume_stream(
///         "Continue chapter three",
///         |payload| print!("{}", payload),
///         Some(|err: StreamError| eprintln!("{}", err.user_message())),
///     )
///     .await;
/// ```
pub struct StreamEventReader<C: HttpClient + ?Sized> {
    http: Arc<C>,
    url: String,
    headers: Headers,
}

impl<C: HttpClient + ?Sized> Clone for StreamEventReader<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            url: self.url.clone(),
            headers: self.headers.clone(),
        }
    }
}

impl<C: HttpClient + ?Sized + 'static> StreamEventReader<C> {
    /// Create a reader posting to `url`.
    pub fn new(http: Arc<C>, url: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        Self {
            http,
            url: url.into(),
            headers,
        }
    }

    /// Add or replace a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stream the response to `prompt`, calling `on_event` per event.
    ///
    /// Either every event is delivered and the call returns `Completed`, or a
    /// prefix of events is followed by exactly one `on_error` call and the
    /// call returns `Failed`. Without an `on_error` the failure is logged.
    pub async fn consume_stream<E, F>(
        &self,
        prompt: &str,
        on_event: E,
        on_error: Option<F>,
    ) -> SessionState
    where
        E: FnMut(String) + Send,
        F: FnMut(StreamError) + Send,
    {
        let mut sink = CallbackSink::new(on_event, on_error);
        self.consume_with_sink(&AiRequest::new(prompt), &mut sink)
            .await
    }

    /// Stream the response to `request` into `sink`.
    pub async fn consume_with_sink<S>(&self, request: &AiRequest, sink: &mut S) -> SessionState
    where
        S: EventSink + ?Sized,
    {
        self.run(request, sink, None).await
    }

    /// Stream only the assistant's text, stopping at the end-of-answer marker.
    ///
    /// Payloads are interpreted by [`parse_completion_payload`](super::parse_completion_payload).
    pub async fn consume_text<E, F>(
        &self,
        prompt: &str,
        on_text: E,
        on_error: Option<F>,
    ) -> SessionState
    where
        E: FnMut(String) + Send,
        F: FnMut(StreamError) + Send,
    {
        let mut sink = TextSink::new(CallbackSink::new(on_text, on_error));
        self.consume_with_sink(&AiRequest::new(prompt), &mut sink)
            .await
    }

    /// Stream the response as a [`Stream`] of payloads.
    ///
    /// The request is issued on first poll. A failure is yielded once as the
    /// last item.
    pub fn events(&self, request: AiRequest) -> EventStream {
        let start = EventsState::Pending {
            reader: self.clone(),
            request,
        };
        Box::pin(stream::unfold(start, |state| async move {
            match state {
                EventsState::Pending { reader, request } => {
                    let mut session = StreamSession::new();
                    match session
                        .open(reader.http.as_ref(), &reader.url, &request, &reader.headers)
                        .await
                    {
                        Ok(()) => advance(session).await,
                        Err(e) => Some((Err(e), EventsState::Done)),
                    }
                }
                EventsState::Open(session) => advance(session).await,
                EventsState::Done => None,
            }
        }))
    }

    /// Run a session on a background task.
    ///
    /// The returned handle can cancel the session. After
    /// [`StreamHandle::cancel`] no new `sink` call begins; a call already
    /// running on another worker is allowed to finish. Once
    /// [`StreamHandle::join`] returns the sink has been dropped.
    pub fn spawn<S>(&self, request: AiRequest, mut sink: S) -> StreamHandle
    where
        S: EventSink + 'static,
    {
        let reader = self.clone();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (abort, registration) = AbortHandle::new_pair();

        let task = tokio::spawn(async move {
            let session = async move { reader.run(&request, &mut sink, Some(&flag)).await };
            Abortable::new(session, registration)
                .await
                .unwrap_or(SessionState::Cancelled)
        });

        StreamHandle {
            abort,
            cancelled,
            task,
        }
    }

    async fn run<S>(
        &self,
        request: &AiRequest,
        sink: &mut S,
        cancelled: Option<&AtomicBool>,
    ) -> SessionState
    where
        S: EventSink + ?Sized,
    {
        let mut session = StreamSession::new();
        info!(url = %self.url, prompt_len = request.prompt.len(), "starting stream");

        if let Err(err) = session
            .open(self.http.as_ref(), &self.url, request, &self.headers)
            .await
        {
            if !is_cancelled(cancelled) {
                sink.on_error(err);
            }
            return session.state();
        }

        drive(&mut session, sink, cancelled).await
    }
}

/// Deliver every event of an open session to `sink`.
///
/// Stops early, with the session `Completed`, when the sink reports it wants
/// no more events; stops with the session `Cancelled` when `cancelled` is set.
pub async fn drive<S>(
    session: &mut StreamSession,
    sink: &mut S,
    cancelled: Option<&AtomicBool>,
) -> SessionState
where
    S: EventSink + ?Sized,
{
    while let Some(item) = session.next_event().await {
        if is_cancelled(cancelled) {
            session.close();
            break;
        }
        match item {
            Ok(payload) => {
                sink.on_event(payload);
                if !sink.wants_more() {
                    debug!(events = session.events_emitted(), "consumer finished early");
                    session.stop();
                    break;
                }
            }
            Err(err) => {
                sink.on_error(err);
                break;
            }
        }
    }
    if is_cancelled(cancelled) {
        session.close();
    }
    session.state()
}

fn is_cancelled(flag: Option<&AtomicBool>) -> bool {
    flag.map(|f| f.load(Ordering::Acquire)).unwrap_or(false)
}

enum EventsState<C: HttpClient + ?Sized> {
    Pending {
        reader: StreamEventReader<C>,
        request: AiRequest,
    },
    Open(StreamSession),
    Done,
}

async fn advance<C: HttpClient + ?Sized>(
    mut session: StreamSession,
) -> Option<(Result<String, StreamError>, EventsState<C>)> {
    match session.next_event().await {
        Some(Ok(payload)) => Some((Ok(payload), EventsState::Open(session))),
        Some(Err(err)) => Some((Err(err), EventsState::Done)),
        None => None,
    }
}

/// Handle to a session running on a background task.
#[derive(Debug)]
pub struct StreamHandle {
    abort: AbortHandle,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<SessionState>,
}

impl StreamHandle {
    /// Abandon the session. No further sink call begins and the byte source
    /// is dropped. Does not wait for an in-flight call; use [`join`](Self::join)
    /// for that.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to end and return its final state.
    pub async fn join(self) -> Result<SessionState, tokio::task::JoinError> {
        self.task.await
    }
}
