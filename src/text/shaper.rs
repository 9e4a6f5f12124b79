//! Right-to-left shaping: contextual reshaping followed by bidi reordering.
//!
//! Lines are shaped one at a time. The reshaping stage is pluggable through
//! [`ShapingStage`]; whatever it returns is normalized back to text before
//! the Unicode Bidirectional Algorithm turns logical order into the
//! left-to-right visual order that the PDF text operators draw.
//!
//! Shaped lines are memoized in a bounded LRU cache shared by every clone of
//! a shaper, so repeated lines and table cells across chunks are shaped once.

use std::borrow::Cow;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use unicode_bidi::{BidiClass, BidiInfo};

use super::{markup, reshape};
use crate::error::{Error, Result};

/// What a shaping stage can hand back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeOutput {
    /// Shaped text
    Text(String),
    /// UTF-8 bytes that still need decoding
    Bytes(Vec<u8>),
    /// A representation this pipeline cannot consume
    Unsupported(String),
}

impl ShapeOutput {
    /// Decode into text, rejecting unsupported output and invalid UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            ShapeOutput::Text(text) => Ok(text),
            ShapeOutput::Bytes(bytes) => String::from_utf8(bytes).map_err(|e| {
                Error::UnsupportedShapeOutput(format!("shaped bytes are not UTF-8: {}", e))
            }),
            ShapeOutput::Unsupported(what) => Err(Error::UnsupportedShapeOutput(what)),
        }
    }
}

/// The glyph reshaping step applied before bidi reordering.
pub trait ShapingStage: Send + Sync {
    /// Reshape one logical-order line.
    fn reshape(&self, line: &str) -> ShapeOutput;
}

/// Built-in stage producing Arabic presentation forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArabicReshaper;

impl ShapingStage for ArabicReshaper {
    fn reshape(&self, line: &str) -> ShapeOutput {
        ShapeOutput::Text(reshape::reshape(line))
    }
}

/// Number of shaped lines kept by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

type ShapeCache = Arc<Mutex<LruCache<String, String>>>;

/// Shapes lines for display: reshape, then reorder to visual order.
#[derive(Clone)]
pub struct RtlShaper<S = ArabicReshaper> {
    stage: S,
    cache: Option<ShapeCache>,
}

impl Default for RtlShaper<ArabicReshaper> {
    fn default() -> Self {
        Self::new()
    }
}

impl RtlShaper<ArabicReshaper> {
    /// Create a shaper with the built-in Arabic reshaper.
    pub fn new() -> Self {
        Self::with_stage(ArabicReshaper)
    }
}

impl<S: ShapingStage> RtlShaper<S> {
    /// Create a shaper around a custom reshaping stage.
    pub fn with_stage(stage: S) -> Self {
        Self {
            stage,
            cache: None,
        }
        .with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Replace the cache with a fresh one holding up to `capacity` lines.
    ///
    /// A capacity of zero disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity)
            .map(|cap| Arc::new(Mutex::new(LruCache::new(cap))));
        self
    }

    /// Number of shaped lines currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| {
            cache.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    /// Shape one line into visual order.
    ///
    /// Pure left-to-right input comes back unchanged. Failures are not
    /// cached.
    pub fn shape(&self, line: &str) -> Result<String> {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(shaped) = cache.get(line) {
                return Ok(shaped.clone());
            }
        }

        log::trace!("Shaping line (len={})", line.len());
        let reshaped = self.stage.reshape(line).into_text()?;
        let shaped = visual_order(&reshaped).into_owned();

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(line.to_string(), shaped.clone());
        }
        Ok(shaped)
    }

    /// Shape one line and escape it for paragraph markup.
    ///
    /// Escaping runs after shaping so the reshaper sees the original
    /// punctuation.
    pub fn shape_markup(&self, line: &str) -> Result<String> {
        Ok(markup::escape(&self.shape(line)?))
    }
}

impl<S: fmt::Debug> fmt::Debug for RtlShaper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtlShaper")
            .field("stage", &self.stage)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Reorder `text` from logical to visual order, paragraph by paragraph.
pub fn visual_order(text: &str) -> Cow<'_, str> {
    if !contains_rtl(text) {
        return Cow::Borrowed(text);
    }

    let bidi = BidiInfo::new(text, None);
    if !bidi.has_rtl() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for paragraph in &bidi.paragraphs {
        let line = paragraph.range.clone();
        out.push_str(&bidi.reorder_line(paragraph, line));
    }
    Cow::Owned(out)
}

/// Check if `text` contains strong right-to-left characters.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

fn is_rtl_char(ch: char) -> bool {
    matches!(
        unicode_bidi::bidi_class(ch),
        BidiClass::R | BidiClass::AL
    )
}
