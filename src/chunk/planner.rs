//! Splits a text buffer into size-bounded chunks.
//!
//! The chunk count comes from the UTF-8 byte length and the byte budget,
//! but boundaries are placed by character index: every chunk gets
//! `len / count` characters and the last one absorbs the remainder.
//! Boundaries may land mid-line or mid-grapheme; nothing realigns them.

use crate::error::{Error, Result};
use crate::model::Chunk;

/// Bytes in one megabyte as used by chunk budgets.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Plans chunk boundaries for a text buffer.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPlanner {
    max_bytes_per_chunk: u64,
}

impl ChunkPlanner {
    /// Create a planner with a byte budget per chunk.
    pub fn new(max_bytes_per_chunk: u64) -> Result<Self> {
        if max_bytes_per_chunk == 0 {
            return Err(Error::InvalidConfig(
                "max bytes per chunk must be greater than zero".into(),
            ));
        }
        Ok(Self {
            max_bytes_per_chunk,
        })
    }

    /// Create a planner with a budget in megabytes.
    pub fn with_max_mb(max_mb: u64) -> Result<Self> {
        Self::new(max_mb.saturating_mul(BYTES_PER_MB))
    }

    /// Get the byte budget.
    pub fn max_bytes_per_chunk(&self) -> u64 {
        self.max_bytes_per_chunk
    }

    /// Estimate how many chunks `text` needs: `ceil(bytes / budget)`, at least 1.
    ///
    /// The count comes from the encoded length alone. Multibyte text can
    /// therefore need more chunks than it has characters, in which case
    /// every chunk but the last is planned empty.
    pub fn chunk_count(&self, text: &str) -> usize {
        let bytes = text.len() as u64;
        let estimate = bytes.div_ceil(self.max_bytes_per_chunk).max(1);
        usize::try_from(estimate).unwrap_or(usize::MAX)
    }

    /// Plan contiguous, non-overlapping chunks covering all of `text`.
    pub fn plan(&self, text: &str) -> Vec<Chunk> {
        let count = self.chunk_count(text);
        let boundaries = char_boundaries(text);
        let char_len = boundaries.len() - 1;
        let per_chunk = char_len / count;

        let chunks: Vec<Chunk> = (0..count)
            .map(|index| {
                let start = index * per_chunk;
                let end = if index + 1 == count {
                    char_len
                } else {
                    start + per_chunk
                };
                Chunk::new(index, start..end, boundaries[start]..boundaries[end])
            })
            .collect();

        log::debug!(
            "Planned {} chunk(s): bytes={} chars={} budget={}",
            chunks.len(),
            text.len(),
            char_len,
            self.max_bytes_per_chunk
        );

        chunks
    }
}

/// Byte offset of every character start plus the end of the buffer.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect()
}
