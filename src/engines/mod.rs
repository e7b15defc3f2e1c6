//! Extraction engines and the capability interface the orchestrator consumes.
//!
//! Each trait covers exactly one of the external collaborators: the text
//! layer, table detection, embedded images, OCR, and structured parsing.
//! The orchestrator only ever talks to these traits, so alternate engines
//! (a different OCR backend, an ML table detector, a test stub) can be
//! substituted through [`crate::ExtractionConfig`] without touching any
//! orchestration logic.
//!
//! All engine calls are **blocking** — they do file I/O, rasterisation, or
//! spawn external processes. The orchestrator moves them off the async
//! runtime with `spawn_blocking`; implementations must therefore be
//! `Send + Sync` but need no async machinery of their own.
//!
//! ## Default implementations
//!
//! | Trait | Default | Backend |
//! |-------|---------|---------|
//! | [`TextLayerExtractor`] | [`PdfiumTextExtractor`] | pdfium text API |
//! | [`TableExtractor`] | [`HeuristicTableExtractor`] | layout heuristics |
//! | [`ImageExtractor`] | [`PdfiumImageExtractor`] | pdfium page objects |
//! | [`OcrEngine`] | [`TesseractOcr`] | pdfium raster + `tesseract` |
//! | [`StructuredParser`] | [`LayoutStructuredParser`] | block categorisation |

mod images;
mod ocr;
mod structured;
mod tables;
mod text;

pub use images::PdfiumImageExtractor;
pub use ocr::TesseractOcr;
pub use structured::LayoutStructuredParser;
pub use tables::HeuristicTableExtractor;
pub use text::PdfiumTextExtractor;

use crate::error::EngineError;
use crate::model::{ImageArtifact, TabularDataset, TextBlock};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which heuristic the table engine uses to locate table boundaries.
///
/// The orchestrator always tries [`Whitespace`](Self::Whitespace) first and
/// retries with [`RuledLines`](Self::RuledLines) only when the first pass
/// reports zero tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFlavor {
    /// Primary: columns inferred from whitespace alignment across lines.
    Whitespace,
    /// Secondary: rows delimited by drawn rules (`|`, `+---+` grids).
    RuledLines,
}

impl TableFlavor {
    /// Detection order: primary flavor first, secondary as its fallback.
    pub const DETECTION_ORDER: [TableFlavor; 2] =
        [TableFlavor::Whitespace, TableFlavor::RuledLines];
}

/// Returns the embedded text of every page, one entry per page.
///
/// Pages without a text layer yield an empty string — an all-empty result is
/// how a scanned document looks to this engine.
pub trait TextLayerExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>, EngineError>;
}

/// Detects zero or more tables using the requested flavor.
pub trait TableExtractor: Send + Sync {
    fn extract_tables(
        &self,
        path: &Path,
        flavor: TableFlavor,
    ) -> Result<Vec<TabularDataset>, EngineError>;
}

/// Exports every embedded raster image to `output_dir` as PNG files.
///
/// Fails soft on individual unreadable images (they are skipped); returns
/// `Err` only when the document itself cannot be opened. Never blocks or
/// fails the text/table outcome of a run.
pub trait ImageExtractor: Send + Sync {
    fn extract_images(
        &self,
        path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ImageArtifact>, EngineError>;
}

/// Rasterises each page and returns the recognised text for the whole
/// document, concatenated in page order.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<String, EngineError>;
}

/// Parser of last resort: an ordered sequence of categorised content blocks.
pub trait StructuredParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<Vec<TextBlock>, EngineError>;
}
