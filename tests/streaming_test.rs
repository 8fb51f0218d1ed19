//! End-to-end tests for the streaming assistant reader.
//!
//! The wiremock tests drive the real reqwest adapter; the chunk-boundary tests
//! use `MockHttpClient` so the exact split of the body is under test control.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use novelforge::adapters::mock::{MockHttpClient, MockResponse};
use novelforge::adapters::ReqwestHttpClient;
use novelforge::models::AiRequest;
use novelforge::sse::{SessionState, StreamEventReader};
use novelforge::traits::{CallbackSink, HttpError, RecordingSink};
use novelforge::{ClientConfig, NovelForgeClient, StreamError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOCK_URL: &str = "http://forge.test/api/ai/stream";

fn wiremock_reader(server: &MockServer) -> StreamEventReader<ReqwestHttpClient> {
    let config = ClientConfig::new().with_base_url(format!("{}/api", server.uri()));
    NovelForgeClient::new(config)
        .expect("client")
        .stream_reader()
}

fn mock_reader(response: MockResponse) -> StreamEventReader<MockHttpClient> {
    let mock = MockHttpClient::new();
    mock.set_response(MOCK_URL, response);
    StreamEventReader::new(Arc::new(mock), MOCK_URL)
}

/// Run one session to completion and record everything the sink saw.
async fn collect<C>(reader: &StreamEventReader<C>, prompt: &str) -> (SessionState, RecordingSink)
where
    C: novelforge::traits::HttpClient + ?Sized + 'static,
{
    let mut sink = RecordingSink::default();
    let state = reader
        .consume_with_sink(&AiRequest::new(prompt), &mut sink)
        .await;
    (state, sink)
}

#[tokio::test]
async fn test_stream_delivers_events_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/stream"))
        .and(header("Accept", "text/event-stream"))
        .and(body_json(serde_json::json!({"prompt": "Open with rain"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/event-stream")
                .set_body_string("data:Rain fell\n\nevent: ping\ndata: on the roof\r\n: comment\ndata:tail"),
        )
        .mount(&server)
        .await;

    let reader = wiremock_reader(&server);
    let (state, sink) = collect(&reader, "Open with rain").await;

    assert_eq!(state, SessionState::Completed);
    assert_eq!(sink.events, vec!["Rain fell", "on the roof", "tail"]);
    assert!(sink.errors.is_empty());
}

#[tokio::test]
async fn test_error_status_yields_single_error_and_no_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/stream"))
        .respond_with(ResponseTemplate::new(503).set_body_string("data:not an event\n"))
        .mount(&server)
        .await;

    let reader = wiremock_reader(&server);
    let (state, sink) = collect(&reader, "anything").await;

    assert_eq!(state, SessionState::Failed);
    assert!(sink.events.is_empty());
    assert_eq!(sink.errors.len(), 1);
    match &sink.errors[0] {
        StreamError::Status { status, .. } => assert_eq!(*status, 503),
        other => panic!("Expected Status error, got {:?}", other),
    }
    assert!(sink.errors[0].is_retryable());
}

#[tokio::test]
async fn test_unreachable_service_is_setup_failure() {
    let reader = StreamEventReader::new(
        Arc::new(ReqwestHttpClient::new()),
        "http://127.0.0.1:59998/api/ai/stream",
    );
    let (state, sink) = collect(&reader, "anything").await;

    assert_eq!(state, SessionState::Failed);
    assert!(sink.events.is_empty());
    assert_eq!(sink.errors.len(), 1);
    assert!(sink.errors[0].is_setup_failure());
}

#[tokio::test]
async fn test_empty_body_completes_without_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let reader = wiremock_reader(&server);
    let (state, sink) = collect(&reader, "quiet").await;

    assert_eq!(state, SessionState::Completed);
    assert!(sink.events.is_empty());
    assert!(sink.errors.is_empty());
}

#[tokio::test]
async fn test_events_independent_of_chunk_boundaries() {
    let body = "data:第一章\ndata: héllo 🎉\r\n\ndata:\nid: 7\ndata:last".as_bytes();
    let expected = vec!["第一章", "héllo 🎉", "", "last"];

    for split in 0..=body.len() {
        let (head, rest) = body.split_at(split);
        let reader = mock_reader(MockResponse::Stream(vec![
            Bytes::copy_from_slice(head),
            Bytes::copy_from_slice(rest),
        ]));
        let (state, sink) = collect(&reader, "split").await;

        assert_eq!(state, SessionState::Completed, "split at {}", split);
        assert_eq!(sink.events, expected, "split at {}", split);
    }

    // One byte per chunk
    let chunks = body.iter().map(|b| Bytes::copy_from_slice(&[*b])).collect();
    let reader = mock_reader(MockResponse::Stream(chunks));
    let (_, sink) = collect(&reader, "bytes").await;
    assert_eq!(sink.events, expected);
}

#[tokio::test]
async fn test_invalid_utf8_fails_after_earlier_events() {
    let reader = mock_reader(MockResponse::Stream(vec![
        Bytes::from_static(b"data:ok\n"),
        Bytes::from_static(b"data:\xff\xfe\n"),
        Bytes::from_static(b"data:never\n"),
    ]));
    let (state, sink) = collect(&reader, "bad bytes").await;

    assert_eq!(state, SessionState::Failed);
    assert_eq!(sink.events, vec!["ok"]);
    assert_eq!(sink.errors.len(), 1);
    assert!(matches!(sink.errors[0], StreamError::Decode { .. }));
}

#[tokio::test]
async fn test_invalid_utf8_in_same_chunk_as_complete_lines() {
    let joined = mock_reader(MockResponse::Stream(vec![Bytes::from_static(
        b"data:ok\ndata: fine\n\xfe\n",
    )]));
    let split = mock_reader(MockResponse::Stream(vec![
        Bytes::from_static(b"data:ok\ndata: fine\n"),
        Bytes::from_static(b"\xfe\n"),
    ]));

    let (joined_state, joined_sink) = collect(&joined, "joined").await;
    let (split_state, split_sink) = collect(&split, "split").await;

    assert_eq!(joined_state, SessionState::Failed);
    assert_eq!(joined_sink.events, vec!["ok", "fine"]);
    assert_eq!(joined_sink.errors.len(), 1);
    assert!(matches!(joined_sink.errors[0], StreamError::Decode { .. }));
    assert_eq!(split_state, joined_state);
    assert_eq!(split_sink.events, joined_sink.events);
    assert_eq!(split_sink.errors, joined_sink.errors);
}

#[tokio::test]
async fn test_decode_failure_independent_of_chunk_boundaries() {
    let mut body = "data:一\ndata: two\n".as_bytes().to_vec();
    body.push(0xFF);
    body.extend_from_slice(b"data:three\n");

    let whole = mock_reader(MockResponse::Stream(vec![Bytes::from(body.clone())]));
    let (_, expected) = collect(&whole, "whole").await;
    assert_eq!(expected.events, vec!["一", "two"]);
    assert_eq!(expected.errors.len(), 1);

    for split in 0..=body.len() {
        let (head, rest) = body.split_at(split);
        let reader = mock_reader(MockResponse::Stream(vec![
            Bytes::copy_from_slice(head),
            Bytes::copy_from_slice(rest),
        ]));
        let (state, sink) = collect(&reader, "split").await;

        assert_eq!(state, SessionState::Failed, "split at {}", split);
        assert_eq!(sink.events, expected.events, "split at {}", split);
        assert_eq!(sink.errors, expected.errors, "split at {}", split);
    }
}

#[tokio::test]
async fn test_truncated_character_at_end_is_decode_error() {
    // "é" is 0xC3 0xA9; the stream ends after the first byte
    let reader = mock_reader(MockResponse::Stream(vec![
        Bytes::from_static(b"data:a\n"),
        Bytes::from_static(b"data:caf\xc3"),
    ]));
    let (state, sink) = collect(&reader, "truncated").await;

    assert_eq!(state, SessionState::Failed);
    assert_eq!(sink.events, vec!["a"]);
    assert!(matches!(sink.errors[0], StreamError::Decode { .. }));
}

#[tokio::test]
async fn test_read_failure_mid_stream() {
    let reader = mock_reader(MockResponse::StreamThenError(
        vec![Bytes::from_static(b"data:one\ndata:tw")],
        HttpError::Io("connection reset".to_string()),
    ));
    let (state, sink) = collect(&reader, "reset").await;

    assert_eq!(state, SessionState::Failed);
    // The unterminated "tw" is not flushed on failure
    assert_eq!(sink.events, vec!["one"]);
    assert_eq!(sink.errors, vec![StreamError::Read(HttpError::Io(
        "connection reset".to_string()
    ))]);
}

#[tokio::test]
async fn test_events_stream_matches_callbacks() {
    let reader = mock_reader(MockResponse::Stream(vec![
        Bytes::from_static(b"data:a\nda"),
        Bytes::from_static(b"ta:b\n"),
    ]));

    let items: Vec<_> = reader.events(AiRequest::new("s")).collect().await;
    assert_eq!(items, vec![Ok("a".to_string()), Ok("b".to_string())]);
}

#[tokio::test]
async fn test_events_stream_ends_with_error() {
    let reader = mock_reader(MockResponse::StreamError(HttpError::ServerError {
        status: 500,
        message: "boom".to_string(),
    }));

    let items: Vec<_> = reader.events(AiRequest::new("s")).collect().await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(StreamError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_cancel_stops_delivery() {
    let reader = mock_reader(MockResponse::StreamOpen(vec![Bytes::from_static(
        b"data:first\n",
    )]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(0usize));
    let sink = {
        let seen = Arc::clone(&seen);
        let errors = Arc::clone(&errors);
        CallbackSink::new(
            move |p: String| seen.lock().unwrap().push(p),
            Some(move |_err: StreamError| *errors.lock().unwrap() += 1),
        )
    };

    let handle = reader.spawn(AiRequest::new("endless"), sink);
    for _ in 0..50 {
        if !seen.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.cancel();
    let state = handle.join().await.unwrap();

    assert_eq!(state, SessionState::Cancelled);
    assert_eq!(*seen.lock().unwrap(), vec!["first"]);
    assert_eq!(*errors.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let mock = MockHttpClient::new();
    mock.set_response(
        "http://forge.test/a",
        MockResponse::Stream(vec![Bytes::from_static(b"data:alpha\n")]),
    );
    mock.set_response(
        "http://forge.test/b",
        MockResponse::Stream(vec![Bytes::from_static(b"data:beta\n")]),
    );
    let mock = Arc::new(mock);
    let a = StreamEventReader::new(Arc::clone(&mock), "http://forge.test/a");
    let b = StreamEventReader::new(Arc::clone(&mock), "http://forge.test/b");

    let ((_, sink_a), (_, sink_b)) = tokio::join!(collect(&a, "a"), collect(&b, "b"));
    assert_eq!(sink_a.events, vec!["alpha"]);
    assert_eq!(sink_b.events, vec!["beta"]);
}

#[tokio::test]
async fn test_consume_text_stops_at_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Once \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"upon\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" ignored\"}}]}\n\n",
        )))
        .mount(&server)
        .await;

    let reader = wiremock_reader(&server);
    let mut text = String::new();
    let state = reader
        .consume_text(
            "begin",
            |piece| text.push_str(&piece),
            None::<fn(StreamError)>,
        )
        .await;

    assert_eq!(state, SessionState::Completed);
    assert_eq!(text, "Once upon");
}
