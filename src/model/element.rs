//! Layout elements and paragraph styling.

use serde::{Deserialize, Serialize};

use super::TableBlock;

/// A renderable unit placed onto pages in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    /// A paragraph of shaped text in paragraph markup (entities escaped)
    Paragraph {
        /// Escaped, shaped text
        text: String,
        /// Paragraph style
        style: ParagraphStyle,
    },

    /// Vertical whitespace in points
    Spacer {
        /// Height in points
        height: f32,
    },

    /// A grid of shaped cell strings
    Table(TableBlock),
}

impl LayoutElement {
    /// Create a paragraph element.
    pub fn paragraph(text: impl Into<String>, style: ParagraphStyle) -> Self {
        LayoutElement::Paragraph {
            text: text.into(),
            style,
        }
    }

    /// Create a spacer element.
    pub fn spacer(height: f32) -> Self {
        LayoutElement::Spacer { height }
    }

    /// Check if this is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, LayoutElement::Paragraph { .. })
    }

    /// Check if this is a spacer.
    pub fn is_spacer(&self) -> bool {
        matches!(self, LayoutElement::Spacer { .. })
    }

    /// Check if this is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, LayoutElement::Table(_))
    }

    /// Paragraph text, if this is a paragraph.
    pub fn text(&self) -> Option<&str> {
        match self {
            LayoutElement::Paragraph { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Font size in points
    pub font_size: f32,

    /// Baseline-to-baseline distance in points
    pub leading: f32,

    /// Horizontal alignment within the frame
    pub alignment: Alignment,
}

impl ParagraphStyle {
    /// Create a style with the given size and leading, right aligned.
    pub fn new(font_size: f32, leading: f32) -> Self {
        Self {
            font_size,
            leading,
            alignment: Alignment::Right,
        }
    }

    /// Set alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self::new(11.0, 16.0)
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment
    Left,
    /// Center alignment
    Center,
    /// Right alignment (default, suits right-to-left text)
    #[default]
    Right,
}
