//! Per-file conversion: options and the orchestration of planning,
//! scheduling, rendering and writing.
//!
//! # Example
//!
//! ```no_run
//! use txtpdf::convert::{ConvertOptions, TextConverter};
//! use txtpdf::chunk::LogProgress;
//! use std::path::Path;
//!
//! fn main() -> txtpdf::Result<()> {
//!     let options = ConvertOptions::new()
//!         .with_max_chunk_mb(5)
//!         .with_worker_pool_size(8)
//!         .with_font("fonts/Vazirmatn-Regular.ttf");
//!     let converter = TextConverter::new(options)?;
//!
//!     let report = converter.convert_file(
//!         Path::new("input_txt/book.txt"),
//!         Path::new("output_pdf"),
//!         &LogProgress::new("book.txt"),
//!     )?;
//!     println!("{} of {} chunks written", report.succeeded().count(), report.chunk_count);
//!     Ok(())
//! }
//! ```

mod text;

pub use text::{output_stem, RenderContext, TextConverter};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunk::{ProgressConfig, BYTES_PER_MB};
use crate::error::{Error, Result};
use crate::model::ParagraphStyle;
use crate::pdf::{FontLocator, PageConfig};
use crate::text::DEFAULT_SPACER_HEIGHT;

/// Options for converting text files to chunked PDFs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Byte budget per chunk
    pub max_chunk_bytes: u64,

    /// Upper bound on concurrent chunk tasks per file
    pub worker_pool_size: usize,

    /// Minimum percentage change between progress events
    pub progress_percent_threshold: u32,

    /// Minimum seconds between progress events
    pub progress_min_interval: f64,

    /// Page geometry
    pub page: PageConfig,

    /// Font used for shaping metrics and embedding
    pub font: FontLocator,

    /// Paragraph style
    pub style: ParagraphStyle,

    /// Height of blank-line and after-table spacers
    pub spacer_height: f32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 10 * BYTES_PER_MB,
            worker_pool_size: 4,
            progress_percent_threshold: 10,
            progress_min_interval: 2.0,
            page: PageConfig::default(),
            font: FontLocator::default(),
            style: ParagraphStyle::default(),
            spacer_height: DEFAULT_SPACER_HEIGHT,
        }
    }
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk budget in bytes.
    pub fn with_max_chunk_bytes(mut self, bytes: u64) -> Self {
        self.max_chunk_bytes = bytes;
        self
    }

    /// Set the chunk budget in megabytes.
    pub fn with_max_chunk_mb(mut self, mb: u64) -> Self {
        self.max_chunk_bytes = mb.saturating_mul(BYTES_PER_MB);
        self
    }

    /// Set the worker pool size.
    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }

    /// Set progress throttling.
    pub fn with_progress(mut self, percent_threshold: u32, min_interval_secs: f64) -> Self {
        self.progress_percent_threshold = percent_threshold;
        self.progress_min_interval = min_interval_secs;
        self
    }

    /// Set page geometry.
    pub fn with_page(mut self, page: PageConfig) -> Self {
        self.page = page;
        self
    }

    /// Set the font.
    pub fn with_font(mut self, font: impl Into<FontLocator>) -> Self {
        self.font = font.into();
        self
    }

    /// Set the paragraph style.
    pub fn with_style(mut self, style: ParagraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the spacer height.
    pub fn with_spacer_height(mut self, height: f32) -> Self {
        self.spacer_height = height;
        self
    }

    /// Progress throttling as used by the scheduler.
    ///
    /// An interval that [`validate`](Self::validate) would reject never
    /// panics here: negative or NaN becomes zero, too large saturates.
    pub fn progress_config(&self) -> ProgressConfig {
        let min_interval = Duration::try_from_secs_f64(self.progress_min_interval)
            .unwrap_or(if self.progress_min_interval > 0.0 {
                Duration::MAX
            } else {
                Duration::ZERO
            });
        ProgressConfig {
            percent_threshold: self.progress_percent_threshold,
            min_interval,
        }
    }

    /// Check the options before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_bytes == 0 {
            return Err(Error::InvalidConfig("max chunk size must be greater than zero".into()));
        }
        if self.worker_pool_size == 0 {
            return Err(Error::InvalidConfig("worker pool size must be greater than zero".into()));
        }
        Duration::try_from_secs_f64(self.progress_min_interval).map_err(|e| {
            Error::InvalidConfig(format!(
                "invalid progress interval {}: {}",
                self.progress_min_interval, e
            ))
        })?;
        if !(self.style.font_size > 0.0 && self.style.leading > 0.0) {
            return Err(Error::InvalidConfig(
                "font size and leading must be positive".into(),
            ));
        }
        if !(self.spacer_height >= 0.0 && self.spacer_height.is_finite()) {
            return Err(Error::InvalidConfig("spacer height must not be negative".into()));
        }
        self.page.validate()
    }
}
