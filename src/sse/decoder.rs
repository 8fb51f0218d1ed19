//! Incremental UTF-8 decoding across chunk boundaries.

use crate::error::StreamError;

/// Longest UTF-8 sequence minus one: the most that can ever be carried over.
const MAX_PENDING: usize = 3;

/// Output of one [`Utf8Decoder::decode`] call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Decoded {
    /// Text up to the first invalid byte, or the whole chunk minus any
    /// carried partial character.
    pub text: String,
    /// Set when an invalid sequence stopped decoding. Nothing after it is
    /// decoded.
    pub error: Option<StreamError>,
}

impl Decoded {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }
}

/// Decodes a byte stream into text one chunk at a time.
///
/// A character split across two chunks is held back until the rest of its
/// bytes arrive, so the output never depends on where the transport cut the
/// body. Invalid sequences are an error rather than replaced; the text before
/// them is still returned.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    consumed: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes of an incomplete character currently held back.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode the next chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> Decoded {
        let joined;
        let input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut carried = std::mem::take(&mut self.pending);
            carried.extend_from_slice(chunk);
            joined = carried;
            &joined
        };

        let decoded = match std::str::from_utf8(input) {
            Ok(text) => Decoded::ok(text.to_owned()),
            Err(e) => {
                let valid = e.valid_up_to();
                let text = valid_prefix(input, valid);
                match e.error_len() {
                    Some(len) => Decoded {
                        text,
                        error: Some(StreamError::Decode {
                            message: format!(
                                "invalid UTF-8 sequence of {} byte(s) at stream offset {}",
                                len,
                                self.consumed + valid
                            ),
                        }),
                    },
                    None => {
                        debug_assert!(input.len() - valid <= MAX_PENDING);
                        self.pending = input[valid..].to_vec();
                        Decoded::ok(text)
                    }
                }
            }
        };

        self.consumed += decoded.text.len();
        decoded
    }

    /// Signal end of input. Fails if a character was left incomplete.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let dangling = std::mem::take(&mut self.pending);
        Err(StreamError::Decode {
            message: format!(
                "stream ended inside a multi-byte character ({} byte(s) pending at offset {})",
                dangling.len(),
                self.consumed
            ),
        })
    }
}

/// The first `valid` bytes of `input`, already checked by `from_utf8`.
fn valid_prefix(input: &[u8], valid: usize) -> String {
    std::str::from_utf8(&input[..valid])
        .map(str::to_owned)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(decoded: Decoded) -> String {
        assert!(decoded.error.is_none(), "unexpected error: {:?}", decoded.error);
        decoded.text
    }

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(text(decoder.decode(b"data:hi\n")), "data:hi\n");
        assert_eq!(decoder.pending_len(), 0);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_two_byte_char_split() {
        // "é" is C3 A9
        let mut decoder = Utf8Decoder::new();
        assert_eq!(text(decoder.decode(&[b'a', 0xC3])), "a");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(text(decoder.decode(&[0xA9, b'b'])), "éb");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_four_byte_char_split_byte_by_byte() {
        let bytes = "🦀".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&text(decoder.decode(&[*b])));
        }
        assert_eq!(out, "🦀");
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_cjk_split_matches_whole() {
        let whole = "第一章 开始";
        let bytes = whole.as_bytes();
        for cut in 0..=bytes.len() {
            let mut decoder = Utf8Decoder::new();
            let mut out = text(decoder.decode(&bytes[..cut]));
            out.push_str(&text(decoder.decode(&bytes[cut..])));
            assert_eq!(out, whole, "cut at {}", cut);
            assert!(decoder.finish().is_ok());
        }
    }

    #[test]
    fn test_invalid_byte_keeps_valid_prefix() {
        let mut decoder = Utf8Decoder::new();
        let decoded = decoder.decode(b"data:ok\n\xFFdata:never\n");
        assert_eq!(decoded.text, "data:ok\n");
        let err = decoded.error.unwrap();
        assert!(matches!(err, StreamError::Decode { .. }));
        assert!(err.to_string().contains("offset 8"));
    }

    #[test]
    fn test_invalid_offset_counts_earlier_chunks() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(text(decoder.decode(b"ab")), "ab");
        let decoded = decoder.decode(&[b'c', 0xFF]);
        assert_eq!(decoded.text, "c");
        assert!(decoded.error.unwrap().to_string().contains("offset 3"));
    }

    #[test]
    fn test_invalid_continuation_after_carry() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(text(decoder.decode(&[0xE4])), "");
        let decoded = decoder.decode(&[b'x']);
        assert_eq!(decoded.text, "");
        assert!(decoded.error.is_some());
    }

    #[test]
    fn test_finish_with_pending_bytes_fails() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(text(decoder.decode(&[0xF0, 0x9F])), "");
        let err = decoder.finish().unwrap_err();
        assert!(err.to_string().contains("2 byte(s) pending"));
    }
}
