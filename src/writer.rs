//! Output writer: serialise extracted content into artifact files.
//!
//! Pure formatting — no extraction logic, no data mutation. Every function
//! here is a deterministic map of `(data, path)` to file bytes, and
//! re-running it overwrites the same path with identical content, so batch
//! retries are always safe.
//!
//! This module also owns the artifact naming contract other tooling depends
//! on:
//!
//! ```text
//! <output_dir>/<base>.txt                  text layer
//! <output_dir>/<base>_ocr.txt              OCR text
//! <output_dir>/<base>_structured.txt       structured blocks
//! <output_dir>/<base>_tables.csv           all tables, CSV
//! <output_dir>/<base>_tables.json          all tables, JSON
//! <output_dir>/<base>_table_<n>.xlsx       one spreadsheet per table, 1-based
//! <output_dir>/<base>_page<p>_img<i>.png   embedded images, 1-based
//! ```

use crate::error::ExtractError;
use crate::model::TabularDataset;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

// ── Naming contract ──────────────────────────────────────────────────────

/// Base name of a document: its file stem, used for all artifact names.
pub fn document_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

pub fn text_artifact_path(output_dir: &Path, base: &str) -> PathBuf {
    output_dir.join(format!("{base}.txt"))
}

pub fn ocr_artifact_path(output_dir: &Path, base: &str) -> PathBuf {
    output_dir.join(format!("{base}_ocr.txt"))
}

pub fn structured_artifact_path(output_dir: &Path, base: &str) -> PathBuf {
    output_dir.join(format!("{base}_structured.txt"))
}

pub fn csv_artifact_path(output_dir: &Path, base: &str) -> PathBuf {
    output_dir.join(format!("{base}_tables.csv"))
}

pub fn json_artifact_path(output_dir: &Path, base: &str) -> PathBuf {
    output_dir.join(format!("{base}_tables.json"))
}

/// Path of the spreadsheet for table `n` (1-based).
pub fn table_artifact_path(output_dir: &Path, base: &str, n: usize) -> PathBuf {
    output_dir.join(format!("{base}_table_{n}.xlsx"))
}

/// Path of embedded image `index` on page `page` (both 1-based).
pub fn image_artifact_path(output_dir: &Path, base: &str, page: usize, index: usize) -> PathBuf {
    output_dir.join(format!("{base}_page{page}_img{index}.png"))
}

// ── Writers ──────────────────────────────────────────────────────────────

/// Write a plain UTF-8 text artifact.
pub fn write_text(text: &str, path: &Path) -> Result<(), ExtractError> {
    write_bytes(text.as_bytes(), path)
}

/// Write all tables into one CSV file, each table preceded by a
/// `--- Table N ---` separator line (N starting at 1).
pub fn write_tables_csv(tables: &[TabularDataset], path: &Path) -> Result<(), ExtractError> {
    let mut body = String::new();

    for (idx, table) in tables.iter().enumerate() {
        body.push_str(&format!("--- Table {} ---\n", idx + 1));
        body.push_str(&table_to_csv(table, path)?);
        body.push('\n');
    }

    write_bytes(body.as_bytes(), path)
}

/// Write all tables into one JSON file: an array with one inner array per
/// table, each inner array holding one object per row. Column order inside
/// each row object is the detection order.
pub fn write_tables_json(tables: &[TabularDataset], path: &Path) -> Result<(), ExtractError> {
    let value = tables_to_json(tables);
    let json = serde_json::to_string_pretty(&value).map_err(|e| ExtractError::WriteFailure {
        path: path.to_path_buf(),
        detail: format!("JSON serialisation failed: {e}"),
    })?;
    write_bytes(json.as_bytes(), path)
}

/// Write one spreadsheet per table, returning the created paths in table
/// order.
pub fn write_tables_excel(
    tables: &[TabularDataset],
    output_dir: &Path,
    base: &str,
) -> Result<Vec<PathBuf>, ExtractError> {
    let mut paths = Vec::with_capacity(tables.len());

    for (idx, table) in tables.iter().enumerate() {
        let path = table_artifact_path(output_dir, base, idx + 1);
        write_table_xlsx(table, &path)?;
        paths.push(path);
    }

    Ok(paths)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExtractError::WriteFailure {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        }
    }
    std::fs::write(path, bytes).map_err(|e| ExtractError::WriteFailure {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Render one table as CSV (header row + data rows).
fn table_to_csv(table: &TabularDataset, path: &Path) -> Result<String, ExtractError> {
    let to_write_failure = |detail: String| ExtractError::WriteFailure {
        path: path.to_path_buf(),
        detail,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(table.columns())
        .map_err(|e| to_write_failure(e.to_string()))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| to_write_failure(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| to_write_failure(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| to_write_failure(e.to_string()))
}

/// Build the JSON value for the table artifact.
fn tables_to_json(tables: &[TabularDataset]) -> serde_json::Value {
    let outer: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            let rows: Vec<serde_json::Value> = (0..table.row_count())
                .map(|r| {
                    // serde_json is built with preserve_order, so insertion
                    // order (= detection column order) survives into the file.
                    let mut obj = serde_json::Map::new();
                    for (col, cell) in table.record(r) {
                        obj.insert(col.to_string(), serde_json::Value::String(cell.to_string()));
                    }
                    serde_json::Value::Object(obj)
                })
                .collect();
            serde_json::Value::Array(rows)
        })
        .collect();
    serde_json::Value::Array(outer)
}

fn write_table_xlsx(table: &TabularDataset, path: &Path) -> Result<(), ExtractError> {
    let to_write_failure = |detail: String| ExtractError::WriteFailure {
        path: path.to_path_buf(),
        detail,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| to_write_failure(e.to_string()))?;
        }
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (c, col) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, c as u16, col.as_str())
            .map_err(|e| to_write_failure(e.to_string()))?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet
                .write_string((r + 1) as u32, c as u16, cell.as_str())
                .map_err(|e| to_write_failure(e.to_string()))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| to_write_failure(e.to_string()))
}
