//! Splits a byte stream into text lines.

/// Accumulates raw bytes and hands back complete lines.
///
/// Lines are decoded lossily: malformed UTF-8 becomes U+FFFD rather
/// than an error. Surrounding whitespace (including `\r`) is trimmed
/// and blank lines are skipped.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every line they complete
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(line) = decode_line(&raw) {
                lines.push(line);
            }
        }
        lines
    }

    /// Flush whatever is left after the stream ends
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        decode_line(&raw)
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
