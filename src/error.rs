//! Error types for txtpdf library.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for txtpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting text to PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The font resource could not be located.
    #[error("Font file not found: {}", .0.display())]
    FontNotFound(PathBuf),

    /// The font resource exists but is not a usable TrueType/OpenType font.
    #[error("Invalid font {}: {reason}", path.display())]
    FontInvalid {
        /// Path of the rejected font
        path: PathBuf,
        /// Parser diagnostic
        reason: String,
    },

    /// The shaping stage produced output that cannot be turned back into text.
    #[error("Unsupported shaping output: {0}")]
    UnsupportedShapeOutput(String),

    /// The destination PDF could not be opened or written.
    #[error("Failed to write document {}: {source}", path.display())]
    DocumentWriteFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Configuration rejected before any work started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be constructed.
    #[error("Worker pool error: {0}")]
    Pool(String),

    /// A chunk task panicked.
    #[error("Chunk task panicked: {0}")]
    TaskPanicked(String),

    /// Input text is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The layout engine rejected or failed to render the document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Error during report rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Classify this error for reporting in a [`crate::RenderResult`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::FontNotFound(_) => ErrorKind::FontNotFound,
            Error::FontInvalid { .. } => ErrorKind::FontInvalid,
            Error::UnsupportedShapeOutput(_) => ErrorKind::UnsupportedShapeOutput,
            Error::DocumentWriteFailed { .. } => ErrorKind::DocumentWriteFailed,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::Pool(_) => ErrorKind::Pool,
            Error::TaskPanicked(_) => ErrorKind::TaskPanicked,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Pdf(_) => ErrorKind::Pdf,
            Error::Render(_) => ErrorKind::Render,
        }
    }
}

impl From<genpdf::error::Error> for Error {
    fn from(err: genpdf::error::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

/// Plain-data classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// I/O failure outside document writing
    Io,
    /// Font resource missing
    FontNotFound,
    /// Font resource unparsable
    FontInvalid,
    /// Shaping stage returned an unusable representation
    UnsupportedShapeOutput,
    /// Output PDF could not be written
    DocumentWriteFailed,
    /// Options rejected
    InvalidConfig,
    /// Worker pool construction failed
    Pool,
    /// Task panicked
    TaskPanicked,
    /// Input not UTF-8
    Encoding,
    /// Layout or PDF rendering failed
    Pdf,
    /// Report rendering failed
    Render,
}
