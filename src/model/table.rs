//! Table types.

use serde::{Deserialize, Serialize};

/// A block of contiguous `|`-delimited lines parsed into rows of cells.
///
/// Rows keep their own cell count; nothing pads a short row to the widest
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Create a new empty table block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table block from rows, dropping rows without cells.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut block = Self::new();
        for row in rows {
            block.push_row(row.into_iter().map(Into::into).collect());
        }
        block
    }

    /// Append a row. Rows with no cells are ignored.
    pub fn push_row(&mut self, cells: Vec<String>) {
        if !cells.is_empty() {
            self.rows.push(cells);
        }
    }

    /// Get the rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the block has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the block and return its rows.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
