//! Page geometry and line wrapping.
//!
//! Pagination, alignment and table drawing belong to the flow layout engine
//! behind [`DocumentBuilder`](super::DocumentBuilder). This module only
//! describes the page and breaks shaped, visual-order text into lines, so
//! right-to-left paragraphs keep their first words on the first line.

use serde::{Deserialize, Serialize};

use super::font::RegisteredFont;
use crate::error::{Error, Result};
use crate::text::contains_rtl;

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.2756;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 841.8898;
/// Default margin on every side, in points.
pub const DEFAULT_MARGIN: f32 = 36.0;

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Convert points to millimetres.
pub(crate) fn to_mm(points: f32) -> f64 {
    f64::from(points) * MM_PER_POINT
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Same margin on all four sides.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

impl From<Margins> for genpdf::Margins {
    fn from(m: Margins) -> Self {
        genpdf::Margins::trbl(to_mm(m.top), to_mm(m.right), to_mm(m.bottom), to_mm(m.left))
    }
}

/// Fixed page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Page margins
    #[serde(default)]
    pub margins: Margins,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageConfig {
    /// Create a page of the given size with default margins.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    /// A4 portrait.
    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    /// Set the margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Width available for content.
    pub fn frame_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Height available for content.
    pub fn frame_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Paper size for the layout engine.
    pub(crate) fn paper_size(&self) -> genpdf::Size {
        genpdf::Size::new(to_mm(self.width), to_mm(self.height))
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        let m = &self.margins;
        let all = [self.width, self.height, m.top, m.right, m.bottom, m.left];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("page geometry must be finite".into()));
        }
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| *v < 0.0) {
            return Err(Error::InvalidConfig("margins must not be negative".into()));
        }
        if self.frame_width() <= 0.0 || self.frame_height() <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "margins leave no frame on a {}x{} page",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Appearance of table cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    pub font_size: f32,
    pub leading: f32,
    /// Inner cell padding in points
    pub padding: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            leading: 14.0,
            padding: 6.0,
        }
    }
}

/// Greedy word wrap of visual-order `text` into lines no wider than `max_width`.
///
/// Words are split on whitespace and rejoined with single spaces, so runs of
/// spaces and tabs inside a line collapse to one space and leading or
/// trailing whitespace is dropped. Right-to-left text fills lines from the
/// visual end. Words wider than a line are broken between characters.
pub fn wrap(font: &RegisteredFont, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let rtl = contains_rtl(text);
    let mut words: Vec<&str> = text.split_whitespace().collect();
    if rtl {
        words.reverse();
    }

    let space = font.char_width(' ', size);
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_width = 0.0f32;

    for word in words {
        for piece in break_word(font, word, size, max_width, rtl) {
            let w = font.text_width(&piece, size);
            let needed = if current.is_empty() { w } else { current_width + space + w };
            if needed > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = w;
            } else {
                current_width = needed;
            }
            current.push(piece);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
        .into_iter()
        .map(|mut line| {
            if rtl {
                line.reverse();
            }
            line.join(" ")
        })
        .collect()
}

/// Split a word that is wider than `max_width` into pieces in flow order.
fn break_word(
    font: &RegisteredFont,
    word: &str,
    size: f32,
    max_width: f32,
    rtl: bool,
) -> Vec<String> {
    if font.text_width(word, size) <= max_width {
        return vec![word.to_string()];
    }

    let chars: Vec<char> = if rtl {
        word.chars().rev().collect()
    } else {
        word.chars().collect()
    };

    let mut pieces = Vec::new();
    let mut piece: Vec<char> = Vec::new();
    let mut width = 0.0f32;
    for ch in chars {
        let w = font.char_width(ch, size);
        if width + w > max_width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(ch);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }

    pieces
        .into_iter()
        .map(|mut p| {
            if rtl {
                p.reverse();
            }
            p.into_iter().collect()
        })
        .collect()
}
