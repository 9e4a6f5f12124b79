//! Detection of pipe-delimited table blocks in plain text.
//!
//! A line is a table row when its trimmed form starts with `|`. Consecutive
//! rows form one block; the first other line (or the end of input) closes
//! it. Splitting keeps only what lies between the first and last pipe,
//! trims every cell and drops empty ones. Blocks that end up without rows
//! are discarded silently.

use std::convert::Infallible;

use crate::model::TableBlock;

/// Source lines split into table blocks and ordinary lines, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A line outside any table
    Line(&'a str),
    /// A closed table block
    Table(TableBlock),
}

/// Detects `|`-prefixed table blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDetector;

impl TableDetector {
    /// Create a new table detector.
    pub fn new() -> Self {
        Self
    }

    /// Check if a line qualifies as a table row.
    pub fn is_table_row(line: &str) -> bool {
        line.trim().starts_with('|')
    }

    /// Split one row into trimmed, non-empty cells.
    ///
    /// Text before the first pipe and after the last pipe is discarded.
    pub fn split_row(line: &str) -> Vec<String> {
        let parts: Vec<&str> = line.trim().split('|').collect();
        if parts.len() < 2 {
            return Vec::new();
        }
        parts[1..parts.len() - 1]
            .iter()
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse buffered rows into a block, or `None` if no row has cells.
    ///
    /// Every line is treated as a row; callers buffer only qualifying lines.
    pub fn parse_block<S: AsRef<str>>(lines: &[S]) -> Option<TableBlock> {
        match Self::parse_block_with(lines, Ok::<_, Infallible>) {
            Ok(block) => block,
            Err(never) => match never {},
        }
    }

    /// Like [`parse_block`](Self::parse_block), passing every cell through
    /// `map_cell` after the row is split.
    ///
    /// Rows are split on the raw line, so cells stay in logical column
    /// order whatever `map_cell` does to their text.
    pub fn parse_block_with<S, F, E>(
        lines: &[S],
        mut map_cell: F,
    ) -> Result<Option<TableBlock>, E>
    where
        S: AsRef<str>,
        F: FnMut(String) -> Result<String, E>,
    {
        let mut block = TableBlock::new();
        for line in lines {
            let cells = Self::split_row(line.as_ref())
                .into_iter()
                .map(&mut map_cell)
                .collect::<Result<Vec<_>, E>>()?;
            block.push_row(cells);
        }

        if block.is_empty() {
            log::debug!("Dropping table block without cells ({} lines)", lines.len());
            Ok(None)
        } else {
            Ok(Some(block))
        }
    }

    /// Split `lines` into table blocks and ordinary lines, preserving order.
    pub fn detect<'a>(&self, lines: &[&'a str]) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();

        for &line in lines {
            if Self::is_table_row(line) {
                buffer.push(line);
                continue;
            }
            if !buffer.is_empty() {
                segments.extend(Self::parse_block(&buffer).map(Segment::Table));
                buffer.clear();
            }
            segments.push(Segment::Line(line));
        }

        if !buffer.is_empty() {
            segments.extend(Self::parse_block(&buffer).map(Segment::Table));
        }

        segments
    }
}
