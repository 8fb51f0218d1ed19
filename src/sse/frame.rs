//! Line assembly and event extraction.

/// Marker that turns a frame into an event.
pub const DATA_MARKER: &str = "data:";

/// Accumulates decoded text and cuts it into frames on `\n`.
///
/// Frames are returned without their terminator; a single `\r` before the
/// `\n` is dropped as well so CRLF bodies frame the same as LF bodies.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text received but not yet terminated.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append text and return every frame it completed, in order.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].find('\n') {
            let end = start + pos;
            frames.push(strip_cr(&self.buffer[start..end]).to_string());
            start = end + 1;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
        frames
    }

    /// End of input: hand back the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.buffer);
        Some(strip_cr(&tail).to_string())
    }

    /// Drop buffered text without producing a frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Extract the event payload from a frame.
///
/// Returns `None` for frames without the `data:` marker. One space directly
/// after the marker is dropped; anything beyond it is payload.
pub fn extract_event(frame: &str) -> Option<String> {
    let rest = frame.strip_prefix(DATA_MARKER)?;
    let payload = rest.strip_prefix(' ').unwrap_or(rest);
    Some(payload.to_string())
}
