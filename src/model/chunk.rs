//! Chunk type.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A contiguous range of a text buffer rendered as one document.
///
/// `chars` is the range in character indices; `bytes` is the same range
/// expressed in UTF-8 byte offsets so the slice can be taken without
/// rescanning the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position of this chunk within its source
    pub index: usize,
    /// Character-index range `[start, end)`
    pub chars: Range<usize>,
    /// Byte-offset range matching `chars`
    pub bytes: Range<usize>,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(index: usize, chars: Range<usize>, bytes: Range<usize>) -> Self {
        Self {
            index,
            chars,
            bytes,
        }
    }

    /// Number of characters in this chunk.
    pub fn char_len(&self) -> usize {
        self.chars.end - self.chars.start
    }

    /// Check if this chunk covers no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Borrow this chunk's text out of the buffer it was planned from.
    ///
    /// Returns an empty string if the chunk does not belong to `text`.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.bytes.clone()).unwrap_or_default()
    }

    /// Output file name for this chunk: `<stem>_<index>.pdf`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}_{}.pdf", stem, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_uses_byte_range() {
        let text = "héllo wörld";
        // "wörld" starts at char 6, byte 7
        let chunk = Chunk::new(1, 6..11, 7..text.len());
        assert_eq!(chunk.slice(text), "wörld");
        assert_eq!(chunk.char_len(), 5);
    }

    #[test]
    fn test_slice_foreign_text_is_empty() {
        let chunk = Chunk::new(0, 0..10, 0..10);
        assert_eq!(chunk.slice("short"), "");
    }

    #[test]
    fn test_file_name() {
        let chunk = Chunk::new(3, 0..0, 0..0);
        assert_eq!(chunk.file_name("novel"), "novel_3.pdf");
        assert!(chunk.is_empty());
    }
}
