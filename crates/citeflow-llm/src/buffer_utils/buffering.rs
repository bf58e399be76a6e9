use anyhow::Result;
use std::collections::VecDeque;

/// Byte buffer that hands out complete lines as network chunks arrive.
/// Chunk boundaries can split lines and multi-byte characters; nothing is
/// decoded until a full line is available.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n), trimmed.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(Self::decode(&line_bytes))
    }

    /// Drain whatever is left once the byte stream has ended.
    /// Servers are allowed to omit the final newline.
    pub fn take_remaining(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line_bytes: Vec<u8> = self.buffer.drain(..).collect();
        Some(Self::decode(&line_bytes))
    }

    fn decode(bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(|s| s.trim().to_string())
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in event stream: {}", e))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_buffer_basic() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"line1\nline2\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "line1");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "line2");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "partial line");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        let text = "caf\u{e9}\n".as_bytes();

        buffer.extend(&text[..4]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&text[4..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_take_remaining_without_newline() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(b"data: tail");

        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.take_remaining().unwrap().unwrap(), "data: tail");
        assert!(buffer.take_remaining().is_none());
    }
}
