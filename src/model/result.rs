//! Per-chunk outcomes and the per-file report that aggregates them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Outcome of rendering one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderResult {
    /// The chunk was written to `output_path`.
    Success {
        /// Index of the chunk
        chunk_index: usize,
        /// Path of the written PDF
        output_path: PathBuf,
        /// Number of layout elements placed
        element_count: usize,
    },

    /// The chunk failed; siblings are unaffected.
    Failure {
        /// Index of the chunk
        chunk_index: usize,
        /// Failure classification
        kind: ErrorKind,
        /// Human-readable cause
        message: String,
    },
}

impl RenderResult {
    /// Create a success result.
    pub fn success(chunk_index: usize, output_path: PathBuf, element_count: usize) -> Self {
        RenderResult::Success {
            chunk_index,
            output_path,
            element_count,
        }
    }

    /// Create a failure result from an error.
    pub fn failure(chunk_index: usize, error: &Error) -> Self {
        RenderResult::Failure {
            chunk_index,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Index of the chunk this result belongs to.
    pub fn chunk_index(&self) -> usize {
        match self {
            RenderResult::Success { chunk_index, .. } | RenderResult::Failure { chunk_index, .. } => {
                *chunk_index
            }
        }
    }

    /// Check if the chunk succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RenderResult::Success { .. })
    }

    /// Failure kind, if the chunk failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            RenderResult::Failure { kind, .. } => Some(*kind),
            RenderResult::Success { .. } => None,
        }
    }

    /// Output path, if the chunk succeeded.
    pub fn output_path(&self) -> Option<&PathBuf> {
        match self {
            RenderResult::Success { output_path, .. } => Some(output_path),
            RenderResult::Failure { .. } => None,
        }
    }
}

/// Aggregated results for one source text.
///
/// A report with some failures is a partial success; retrying is left to
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Source name used for output naming
    pub source: String,

    /// Number of planned chunks
    pub chunk_count: usize,

    /// One result per chunk, ordered by chunk index
    pub results: Vec<RenderResult>,
}

impl ConversionReport {
    /// Create a new report.
    pub fn new(source: impl Into<String>, results: Vec<RenderResult>) -> Self {
        Self {
            source: source.into(),
            chunk_count: results.len(),
            results,
        }
    }

    /// Results of chunks that were written.
    pub fn succeeded(&self) -> impl Iterator<Item = &RenderResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Results of chunks that failed.
    pub fn failed(&self) -> impl Iterator<Item = &RenderResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Check if every chunk succeeded.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(RenderResult::is_success)
    }

    /// Paths of every written PDF, in chunk order.
    pub fn output_paths(&self) -> Vec<&PathBuf> {
        self.results.iter().filter_map(RenderResult::output_path).collect()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}
