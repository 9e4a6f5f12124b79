//! Turns the lines of one chunk into layout elements.
//!
//! Rendering is a two-state machine. In `Normal` every line becomes a
//! paragraph, or a spacer when blank. A table row switches to
//! `BufferingTable`; the buffered raw rows are split into cells, each cell
//! is shaped on its own, and the table is emitted followed by a spacer when
//! a non-table line arrives or the input ends.

use super::shaper::{ArabicReshaper, RtlShaper, ShapingStage};
use super::table_detector::TableDetector;
use crate::error::Result;
use crate::model::{LayoutElement, ParagraphStyle};
use crate::pdf::FontLocator;

/// Default vertical gap emitted for blank lines and after tables, in points.
pub const DEFAULT_SPACER_HEIGHT: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    Normal,
    BufferingTable,
}

/// Renders lines into an ordered list of [`LayoutElement`]s.
#[derive(Debug, Clone)]
pub struct LineRenderer<S = ArabicReshaper> {
    shaper: RtlShaper<S>,
    style: ParagraphStyle,
    spacer_height: f32,
}

impl Default for LineRenderer<ArabicReshaper> {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRenderer<ArabicReshaper> {
    /// Create a renderer with the built-in shaper and default style.
    pub fn new() -> Self {
        Self::with_shaper(RtlShaper::new())
    }
}

impl<S: ShapingStage> LineRenderer<S> {
    /// Create a renderer around a specific shaper.
    pub fn with_shaper(shaper: RtlShaper<S>) -> Self {
        Self {
            shaper,
            style: ParagraphStyle::default(),
            spacer_height: DEFAULT_SPACER_HEIGHT,
        }
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

    /// Get the shaper.
    pub fn shaper(&self) -> &RtlShaper<S> {
        &self.shaper
    }

    /// Get the paragraph style.
    pub fn style(&self) -> &ParagraphStyle {
        &self.style
    }

    /// Render `lines` in order.
    ///
    /// The font is resolved first so a missing or broken font aborts before
    /// any element is produced.
    pub fn render<L: AsRef<str>>(
        &self,
        lines: impl IntoIterator<Item = L>,
        font: &FontLocator,
    ) -> Result<Vec<LayoutElement>> {
        font.load()?;

        let mut elements = Vec::new();
        let mut state = RenderState::Normal;
        let mut buffer: Vec<String> = Vec::new();

        for line in lines {
            let line = line.as_ref();

            if TableDetector::is_table_row(line) {
                buffer.push(line.to_string());
                state = RenderState::BufferingTable;
                continue;
            }

            if state == RenderState::BufferingTable {
                self.flush_table(&mut buffer, &mut elements)?;
                state = RenderState::Normal;
            }

            if line.trim().is_empty() {
                elements.push(LayoutElement::spacer(self.spacer_height));
            } else {
                let text = self.shaper.shape_markup(line)?;
                elements.push(LayoutElement::paragraph(text, self.style));
            }
        }

        if state == RenderState::BufferingTable {
            self.flush_table(&mut buffer, &mut elements)?;
        }

        Ok(elements)
    }

    fn flush_table(
        &self,
        buffer: &mut Vec<String>,
        elements: &mut Vec<LayoutElement>,
    ) -> Result<()> {
        let block =
            TableDetector::parse_block_with(buffer.as_slice(), |cell| self.shaper.shape(&cell))?;
        buffer.clear();
        if let Some(block) = block {
            elements.push(LayoutElement::Table(block));
            elements.push(LayoutElement::spacer(self.spacer_height));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::TableBlock;
    use crate::pdf::font::tests::fixture_font;
    use crate::text::shaper::ShapeOutput;

    fn render(text: &str) -> Vec<LayoutElement> {
        LineRenderer::new().render(text.lines(), &fixture_font()).unwrap()
    }

    #[test]
    fn test_paragraph_then_table() {
        let elements = render("a\n|x|y|\n|p|q|\n");
        assert_eq!(
            elements,
            vec![
                LayoutElement::paragraph("a", ParagraphStyle::default()),
                LayoutElement::Table(TableBlock::from_rows([["x", "y"], ["p", "q"]])),
                LayoutElement::spacer(DEFAULT_SPACER_HEIGHT),
            ]
        );
    }

    #[test]
    fn test_rtl_table_keeps_logical_column_order() {
        let name = "\u{0646}\u{0627}\u{0645}";
        let ali = "\u{0639}\u{0644}\u{06CC}";
        let elements = render(&format!("| {name} | name |\n| x | {ali} |"));

        let shaper = RtlShaper::new();
        let expected = TableBlock::from_rows([
            vec![shaper.shape(name).unwrap(), "name".to_string()],
            vec!["x".to_string(), shaper.shape(ali).unwrap()],
        ]);
        assert_eq!(elements[0], LayoutElement::Table(expected));
    }

    #[test]
    fn test_table_closed_by_following_line() {
        let elements = render("|a|\nafter");
        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_table());
        assert!(elements[1].is_spacer());
        assert_eq!(elements[2].text(), Some("after"));
    }

    #[test]
    fn test_blank_lines_become_spacers() {
        let elements = render("one\n\n   \ntwo");
        let kinds: Vec<bool> = elements.iter().map(LayoutElement::is_spacer).collect();
        assert_eq!(kinds, vec![false, true, true, false]);
    }

    #[test]
    fn test_never_drops_a_line() {
        let text = "p1\n|a|b|\n|c|\n\np2\n|x|\nend";
        let elements = render(text);
        // 5 plain lines, two table blocks each collapsing into table + spacer
        assert_eq!(elements.len(), 5 + 2 * 2);
    }

    #[test]
    fn test_empty_table_block_dropped() {
        let elements = render("a\n| |\nb");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), Some("a"));
        assert_eq!(elements[1].text(), Some("b"));
    }

    #[test]
    fn test_paragraph_escaped() {
        let elements = render("say \"hi\"");
        assert_eq!(elements[0].text(), Some("say &quot;hi&quot;"));
    }

    #[test]
    fn test_missing_font_aborts_before_elements() {
        let err = LineRenderer::new()
            .render(["a", "b"], &FontLocator::new("/missing/font.ttf"))
            .unwrap_err();
        assert!(matches!(err, Error::FontNotFound(_)));
    }

    #[test]
    fn test_shaping_failure_propagates() {
        struct Opaque;
        impl ShapingStage for Opaque {
            fn reshape(&self, _line: &str) -> ShapeOutput {
                ShapeOutput::Unsupported("opaque".into())
            }
        }

        let renderer = LineRenderer::with_shaper(RtlShaper::with_stage(Opaque));
        let err = renderer.render(["a"], &fixture_font()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShapeOutput(_)));
    }

    #[test]
    fn test_custom_style_and_spacer() {
        let style = ParagraphStyle::new(14.0, 20.0);
        let renderer = LineRenderer::new()
            .with_style(style)
            .with_spacer_height(12.0);
        let elements = renderer.render(["x", ""], &fixture_font()).unwrap();
        assert_eq!(elements[0], LayoutElement::paragraph("x", style));
        assert_eq!(elements[1], LayoutElement::spacer(12.0));
    }
}
