//! In-memory representations of extracted content.
//!
//! These types sit between the extraction engines and the output writer.
//! They are deliberately read-only after construction: a [`TabularDataset`]
//! keeps a stable row count for its whole lifetime, and an [`ImageArtifact`]
//! names a path that is unique per (document, page, index) within a run.
//! The writer serialises them without ever mutating them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One detected table: ordered column names plus rows of cell values.
///
/// Column order is preserved exactly as detected; every row has one cell per
/// column (short rows are padded with empty strings at construction, long
/// rows truncated). There are no mutating accessors — once an engine has
/// produced a dataset it is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Build a dataset, normalising every row to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Ordered column names, as detected.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row cells, each row aligned to [`Self::columns`].
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate one row as `(column, cell)` pairs in column order.
    pub fn record(&self, row: usize) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(self.rows[row].iter())
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }
}

/// A raster image exported from a document page.
///
/// `path` follows the stable naming contract
/// `<base_name>_page<page>_img<index>.png`; `page` and `index` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Where the PNG was saved.
    pub path: PathBuf,
    /// 1-based page the image was embedded in.
    pub page: usize,
    /// 1-based position of the image within its page.
    pub index: usize,
}

/// A categorised run of text from the structured document parser.
///
/// `category` is populated only by the structured parser (e.g. `Title`,
/// `ListItem`, `NarrativeText`); text from other engines has no category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub category: Option<String>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, category: Option<String>) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    /// Render as a `[category] text` line, the structured-artifact format.
    pub fn render(&self) -> String {
        match &self.category {
            Some(cat) => format!("[{}] {}", cat, self.text.trim()),
            None => self.text.trim().to_string(),
        }
    }
}
