//! Streaming event ingestion.
//!
//! Turns the chunked body of the streaming AI endpoint into an ordered
//! sequence of event payloads:
//!
//! - `decoder` - incremental UTF-8 decoding that survives split characters
//! - `frame` - line assembly on `\n` and `data:` extraction
//! - `session` - one streaming call and its lifecycle
//! - `reader` - opens sessions and dispatches to callbacks, sinks or a `Stream`
//! - `completion` - optional interpretation of chat-completion payloads
//!
//! Wire format: line-delimited frames; a frame starting with `data:` is an
//! event whose payload is the rest of the line, minus one leading space.
//! Every other frame is ignored.

mod completion;
mod decoder;
mod frame;
mod reader;
mod session;

pub use completion::{parse_completion_payload, CompletionPayload, TextSink, DONE_SENTINEL};
pub use decoder::{Decoded, Utf8Decoder};
pub use frame::{extract_event, LineAssembler, DATA_MARKER};
pub use reader::{drive, EventStream, StreamEventReader, StreamHandle};
pub use session::{SessionState, StreamSession};
