//! # pdfharvest
//!
//! Extract text, tables, and images from PDF documents, with automatic
//! strategy fallback and concurrent batch processing.
//!
//! ## Why this crate?
//!
//! Document-ingestion pipelines see wildly heterogeneous PDFs: born-digital
//! reports with clean text layers, table-heavy financial statements, and
//! scanned or photographed pages with no embedded text at all. No single
//! extraction strategy handles all three. This crate orders the strategies
//! from cheap to expensive and walks them until one finds usable content,
//! while isolating each document in a batch so one broken file never sinks
//! the rest.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF(s)
//!  │
//!  ├─ batch      one concurrent task per document (buffer_unordered)
//!  ├─ images     embedded rasters exported alongside every run (fail-soft)
//!  ├─ auto chain tables → text layer → OCR → structured parsing,
//!  │             first non-empty strategy wins
//!  └─ writer     .txt / _tables.csv / _tables.json / _table_N.xlsx artifacts
//! ```
//!
//! Pinned methods (`txt`, `csv`, `json`, `excel`, `unstructured`) invoke one
//! strategy only and fail with a typed error when it finds nothing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfharvest::{extract, ExtractionConfig, ExtractionMethod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .method(ExtractionMethod::Auto)
//!         .output_dir("extracted_output")
//!         .build()?;
//!     let report = extract("document.pdf", &config).await?;
//!     println!("outcome: {:?}", report.outcome);
//!     eprintln!("tables: {}  images: {}",
//!         report.summary.tables_found,
//!         report.summary.images_saved);
//!     Ok(())
//! }
//! ```
//!
//! Batch mode returns one result per input, in input order, with per-document
//! errors recorded rather than raised:
//!
//! ```rust,no_run
//! use pdfharvest::{extract_batch, ExtractionConfig};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractionConfig::default();
//! let paths: Vec<PathBuf> = vec!["a.pdf".into(), "b.pdf".into()];
//! let report = extract_batch(&paths, &config).await;
//! for doc in report.failed() {
//!     eprintln!("{}: failed", doc.document.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfharvest` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfharvest = { version = "0.4", default-features = false }
//! ```
//!
//! ## Swapping engines
//!
//! Every external engine — text layer, table detection, image export, OCR,
//! structured parsing — sits behind a trait in [`engines`] and is injected
//! through [`ExtractionConfig`]. The defaults are pdfium-backed (plus the
//! system `tesseract` binary for OCR); substitute your own implementation
//! without touching any orchestration logic.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod engines;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod progress;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{extract_batch, extract_batch_sync};
pub use config::{ExtractionConfig, ExtractionConfigBuilder, ExtractionMethod};
pub use error::{EngineError, ExtractError};
pub use extract::{extract, extract_document};
pub use model::{ImageArtifact, TabularDataset, TextBlock};
pub use output::{
    BatchReport, DocumentOutcome, ExtractionOutcome, ExtractionReport, ExtractionSummary,
};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
