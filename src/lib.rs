//! # txtpdf
//!
//! Chunked, parallel conversion of large plain-text files into PDF documents
//! with right-to-left (Arabic/Persian) shaping.
//!
//! A text buffer is split into size-bounded chunks. Each chunk is rendered
//! on a bounded worker pool into its own PDF file named
//! `<stem>_<index>.pdf`. Lines starting with `|` are collected into tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use txtpdf::{convert_file, ConvertOptions};
//!
//! fn main() -> txtpdf::Result<()> {
//!     let options = ConvertOptions::new().with_font("font/Vazirmatn-Regular.ttf");
//!     let report = convert_file("input_txt/book.txt", "output_pdf", options)?;
//!
//!     for result in report.failed() {
//!         eprintln!("chunk {} failed", result.chunk_index());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bounded parallelism**: one task per chunk on a rayon pool
//! - **Fault isolation**: a failing or panicking chunk never affects its siblings
//! - **RTL shaping**: contextual Arabic/Persian forms and bidi reordering, memoized
//!   in a shared LRU cache
//! - **Tables**: pipe-delimited blocks rendered as framed tables whose rows may
//!   continue across pages
//! - **Throttled progress**: percentage and time based

pub mod chunk;
pub mod convert;
pub mod error;
pub mod model;
pub mod pdf;
pub mod text;

pub use chunk::{
    ChunkOutput, ChunkPlanner, ChunkScheduler, LogProgress, NoProgress, ProgressConfig,
    ProgressEvent, ProgressSink,
};
pub use convert::{ConvertOptions, RenderContext, TextConverter};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Alignment, Chunk, ConversionReport, LayoutElement, ParagraphStyle, RenderResult, TableBlock,
};
pub use pdf::{DocumentBuilder, FontLocator, FontRegistry, Margins, PageConfig};
pub use text::{LineRenderer, RtlShaper, TableDetector};

use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a text file into chunked PDFs, logging progress.
///
/// # Example
///
/// ```no_run
/// use txtpdf::{convert_file, ConvertOptions};
///
/// let report = convert_file("notes.txt", "out", ConvertOptions::default()).unwrap();
/// println!("{} chunk(s)", report.chunk_count);
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    output_dir: Q,
    options: ConvertOptions,
) -> Result<ConversionReport> {
    let path = path.as_ref();
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    TextConverter::new(options)?.convert_file(path, output_dir.as_ref(), &LogProgress::new(label))
}

/// Convert an in-memory buffer into chunked PDFs without progress reporting.
pub fn convert_text<Q: AsRef<Path>>(
    text: &str,
    source_name: &str,
    output_dir: Q,
    options: ConvertOptions,
) -> Result<ConversionReport> {
    TextConverter::new(options)?.convert_text(text, source_name, output_dir.as_ref(), &NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_missing_font_reported_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConvertOptions::new()
            .with_max_chunk_bytes(4)
            .with_font("/no/such/font.ttf");
        let report = convert_text("abcdefghijkl", "x.txt", dir.path(), options).unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(report
            .results
            .iter()
            .all(|r| r.error_kind() == Some(ErrorKind::FontNotFound)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
