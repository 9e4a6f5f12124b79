//! One PDF file per call from a list of layout elements.
//!
//! Elements map onto `genpdf` flowables: a paragraph becomes one paragraph
//! per wrapped line, a spacer becomes a break and a table becomes a framed
//! table layout whose cells hold their wrapped lines. Page breaks, table
//! rows that continue on the next page, font embedding and serialization
//! are left to the layout engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::Element as _;

use super::font::RegisteredFont;
use super::layout::{wrap, Margins, PageConfig, TableStyle};
use crate::error::{Error, Result};
use crate::model::{Alignment, LayoutElement, ParagraphStyle, TableBlock};
use crate::text::{contains_rtl, markup};

/// Share of the frame width that pre-wrapped lines may fill, leaving room for
/// rounding in the engine's own text measurement.
const WRAP_FILL: f32 = 0.97;

/// What a successful build wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub output_path: PathBuf,
    pub element_count: usize,
    /// Size of the written file in bytes
    pub bytes_written: usize,
}

/// Lays out elements and serializes them into a PDF file.
///
/// The builder carries configuration only. Every [`build`](Self::build)
/// call starts from a fresh document, so chunks of the same source never
/// share pages or counters.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    font: Arc<RegisteredFont>,
    table_style: TableStyle,
    title: Option<String>,
}

impl DocumentBuilder {
    /// Create a builder embedding `font`.
    pub fn new(font: Arc<RegisteredFont>) -> Self {
        Self {
            font,
            table_style: TableStyle::default(),
            title: None,
        }
    }

    /// Set the table style.
    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Lay out `elements` on pages of `page` and write `output_path`.
    ///
    /// Missing parent directories are created. Any failure to create or
    /// write the destination is a [`Error::DocumentWriteFailed`]; a partly
    /// written file is left in place.
    pub fn build(
        &self,
        elements: &[LayoutElement],
        output_path: &Path,
        page: &PageConfig,
    ) -> Result<BuildSummary> {
        page.validate()?;

        let mut doc = self.document(page)?;
        let frame = page.frame_width() * WRAP_FILL;
        for element in elements {
            match element {
                LayoutElement::Paragraph { text, style } => {
                    self.push_paragraph(&mut doc, text, style, frame)
                }
                LayoutElement::Spacer { height } => {
                    // Break heights count lines of the document's base style
                    let base = self.font.line_height(f32::from(base_size()));
                    doc.push(Break::new(f64::from(height / base)));
                }
                LayoutElement::Table(block) => {
                    if let Some(table) = self.table(block, frame)? {
                        doc.push(table);
                    }
                }
            }
        }

        let mut bytes = Vec::new();
        doc.render(&mut bytes)?;

        let write_failed = |source: io::Error| Error::DocumentWriteFailed {
            path: output_path.to_path_buf(),
            source,
        };
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(output_path, &bytes).map_err(write_failed)?;

        log::debug!(
            "Wrote {} ({} elements, {} bytes, font {})",
            output_path.display(),
            elements.len(),
            bytes.len(),
            self.font.name()
        );

        Ok(BuildSummary {
            output_path: output_path.to_path_buf(),
            element_count: elements.len(),
            bytes_written: bytes.len(),
        })
    }

    /// A fresh document with the font, paper and margins configured.
    fn document(&self, page: &PageConfig) -> Result<genpdf::Document> {
        let data = FontData::new(self.font.data().to_vec(), None).map_err(|e| {
            Error::FontInvalid {
                path: self.font.path().to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let family = FontFamily {
            regular: data.clone(),
            bold: data.clone(),
            italic: data.clone(),
            bold_italic: data,
        };

        let mut doc = genpdf::Document::new(family);
        doc.set_paper_size(page.paper_size());
        doc.set_font_size(base_size());
        doc.set_line_spacing(1.0);
        if let Some(title) = &self.title {
            doc.set_title(title.clone());
        }

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(page.margins);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    fn push_paragraph(
        &self,
        doc: &mut genpdf::Document,
        text: &str,
        style: &ParagraphStyle,
        frame: f32,
    ) {
        let text = markup::unescape(text);
        let size = point_size(style.font_size);
        let line_style = self.line_style(size, style.leading);
        let alignment = engine_alignment(style.alignment);

        for line in wrap(&self.font, &text, f32::from(size), frame) {
            doc.push(Paragraph::new(line).aligned(alignment).styled(line_style));
        }
    }

    fn table(&self, block: &TableBlock, frame: f32) -> Result<Option<TableLayout>> {
        let columns = block.column_count();
        if columns == 0 {
            return Ok(None);
        }

        let style = self.table_style;
        let size = point_size(style.font_size);
        let cell_style = self.line_style(size, style.leading);
        let weights = self.column_weights(block, columns, size);
        let total = weights.iter().sum::<usize>().max(1) as f32;

        let mut table = TableLayout::new(weights.clone());
        table.set_cell_decorator(FrameCellDecorator::new(true, true, true));

        for row in block.rows() {
            let mut table_row = table.row();
            for (c, weight) in weights.iter().enumerate() {
                let width = frame * *weight as f32 / total - 2.0 * style.padding;
                let text = row.get(c).map(String::as_str).unwrap_or("");

                let mut cell = LinearLayout::vertical();
                for line in wrap(&self.font, text, f32::from(size), width.max(f32::from(size))) {
                    let alignment = if contains_rtl(&line) {
                        genpdf::Alignment::Right
                    } else {
                        genpdf::Alignment::Left
                    };
                    cell.push(Paragraph::new(line).aligned(alignment).styled(cell_style));
                }
                table_row.push_element(cell.padded(Margins::uniform(style.padding)));
            }
            table_row.push()?;
        }
        Ok(Some(table))
    }

    /// Column weights from the natural content width of each column.
    fn column_weights(&self, block: &TableBlock, columns: usize, size: u8) -> Vec<usize> {
        let padding = 2.0 * self.table_style.padding;
        let mut widths = vec![0.0f32; columns];
        for row in block.rows() {
            for (c, cell) in row.iter().enumerate() {
                let w = self.font.text_width(cell, f32::from(size)) + padding;
                widths[c] = widths[c].max(w);
            }
        }
        widths.into_iter().map(|w| w.ceil().max(1.0) as usize).collect()
    }

    /// Style whose line height equals `leading` points.
    fn line_style(&self, size: u8, leading: f32) -> Style {
        let natural = self.font.line_height(f32::from(size));
        Style::new()
            .with_font_size(size)
            .with_line_spacing(f64::from(leading / natural))
    }
}

fn base_size() -> u8 {
    point_size(ParagraphStyle::default().font_size)
}

/// The engine sizes fonts in whole points.
fn point_size(size: f32) -> u8 {
    size.round().clamp(1.0, f32::from(u8::MAX)) as u8
}

fn engine_alignment(alignment: Alignment) -> genpdf::Alignment {
    match alignment {
        Alignment::Left => genpdf::Alignment::Left,
        Alignment::Center => genpdf::Alignment::Center,
        Alignment::Right => genpdf::Alignment::Right,
    }
}
