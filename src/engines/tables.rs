//! Table detection over the embedded text layer.
//!
//! Two flavors, matching the two ways tables survive into a PDF text layer:
//!
//! * **Whitespace** — columns kept aligned with runs of spaces. Cells are
//!   split on 2+ consecutive spaces; consecutive lines with the same cell
//!   count form a table region whose first line is the header.
//! * **RuledLines** — tables drawn with explicit rules that extract as `|`
//!   separated rows (optionally framed by `+---+` grid lines, which are
//!   skipped).
//!
//! Detection is a set of pure functions over text lines so the heuristics are
//! testable without any PDF; the [`TableExtractor`] impl only wires the
//! pdfium text layer into them.

use crate::engines::{PdfiumTextExtractor, TableExtractor, TableFlavor, TextLayerExtractor};
use crate::error::EngineError;
use crate::model::TabularDataset;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Default [`TableExtractor`]: layout heuristics over the text layer.
#[derive(Debug, Default)]
pub struct HeuristicTableExtractor;

impl HeuristicTableExtractor {
    pub fn new() -> Self {
        HeuristicTableExtractor
    }
}

impl TableExtractor for HeuristicTableExtractor {
    fn extract_tables(
        &self,
        path: &Path,
        flavor: TableFlavor,
    ) -> Result<Vec<TabularDataset>, EngineError> {
        let pages = PdfiumTextExtractor::new()
            .extract_text(path)
            .map_err(|e| EngineError::Failed {
                engine: "table",
                detail: e.to_string(),
            })?;

        let mut tables = Vec::new();
        for page in &pages {
            let lines: Vec<&str> = page.lines().collect();
            let detected = match flavor {
                TableFlavor::Whitespace => detect_whitespace_tables(&lines),
                TableFlavor::RuledLines => detect_ruled_tables(&lines),
            };
            tables.extend(detected);
        }

        debug!("{:?} flavor: {} tables", flavor, tables.len());
        Ok(tables)
    }
}

// ── Whitespace flavor ────────────────────────────────────────────────────

static RE_CELL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Split a line into cells at runs of 2+ spaces; `None` when the line does
/// not look like a table row (fewer than two cells).
fn whitespace_cells(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<String> = RE_CELL_GAP
        .split(trimmed)
        .map(clean_cell)
        .filter(|c| !c.is_empty())
        .collect();
    if cells.len() >= 2 {
        Some(cells)
    } else {
        None
    }
}

/// Detect whitespace-aligned tables within one page's lines.
pub(crate) fn detect_whitespace_tables(lines: &[&str]) -> Vec<TabularDataset> {
    collect_regions(lines, whitespace_cells)
}

// ── Ruled-line flavor ────────────────────────────────────────────────────

// Pure rule lines carry no data: +----+----+, |----|----|, ============
static RE_RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s|+\-=:]+$").unwrap());

/// Split a `|` delimited row into cells; `None` for non-row lines.
fn ruled_cells(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if !trimmed.contains('|') || RE_RULE_LINE.is_match(trimmed) {
        return None;
    }
    let cells: Vec<String> = trimmed
        .trim_matches('|')
        .split('|')
        .map(clean_cell)
        .collect();
    if cells.len() >= 2 && cells.iter().any(|c| !c.is_empty()) {
        Some(cells)
    } else {
        None
    }
}

/// Detect ruled tables within one page's lines.
pub(crate) fn detect_ruled_tables(lines: &[&str]) -> Vec<TabularDataset> {
    // Drop grid rules first so they don't break row runs.
    let data_lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| {
            let t = l.trim();
            t.is_empty() || !RE_RULE_LINE.is_match(t)
        })
        .collect();
    collect_regions(&data_lines, ruled_cells)
}

// ── Shared region collection ─────────────────────────────────────────────

/// Group consecutive lines with an identical cell count into table regions.
///
/// A region needs a header plus at least one data row; shorter runs are
/// discarded as incidental alignment.
fn collect_regions(
    lines: &[&str],
    cells_of: impl Fn(&str) -> Option<Vec<String>>,
) -> Vec<TabularDataset> {
    let mut tables = Vec::new();
    let mut region: Vec<Vec<String>> = Vec::new();

    let mut flush = |region: &mut Vec<Vec<String>>| {
        if region.len() >= 2 {
            let mut rows = std::mem::take(region);
            let columns = rows.remove(0);
            tables.push(TabularDataset::new(columns, rows));
        } else {
            region.clear();
        }
    };

    for line in lines {
        match cells_of(line) {
            Some(cells) => {
                if let Some(last) = region.last() {
                    if last.len() != cells.len() {
                        flush(&mut region);
                    }
                }
                region.push(cells);
            }
            None => flush(&mut region),
        }
    }
    flush(&mut region);

    tables
}

/// Collapse internal whitespace runs within a cell.
fn clean_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}
