//! Error types for the pdfharvest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot produce an artifact
//!   for this document (bad input file, unknown method, nothing extractable,
//!   artifact could not be persisted). Returned as `Err(ExtractError)` from
//!   the top-level `extract*` functions.
//!
//! * [`EngineError`] — **Recoverable**: a single extraction engine failed
//!   (missing system binary, unreadable page, engine crash). The orchestrator
//!   absorbs these, logs a warning, and treats the engine's result as empty so
//!   the fallback chain can move on to the next strategy. An `EngineError`
//!   never reaches the caller directly.
//!
//! In batch mode a fatal error is recorded against its own document only; it
//! never aborts sibling documents.

use crate::config::ExtractionMethod;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfharvest library.
///
/// Engine-level failures use [`EngineError`] and are absorbed inside the
/// orchestrator rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every strategy for the requested method came back empty.
    ///
    /// For `auto` this means the full fallback chain (tables, text layer,
    /// OCR, structured parsing) was exhausted. For a pinned method it means
    /// the single corresponding engine found nothing.
    #[error("No content found in '{path}' for method '{method}'")]
    NoContentFound {
        path: PathBuf,
        method: ExtractionMethod,
    },

    /// The caller passed a method string outside the supported vocabulary.
    #[error(
        "Unsupported method '{given}'. Choose from: auto, txt, csv, json, excel, unstructured."
    )]
    UnsupportedMethod { given: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// An output artifact could not be persisted.
    #[error("Failed to write artifact '{path}': {detail}")]
    WriteFailure { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A recoverable failure from a single extraction engine.
///
/// The orchestrator logs these as warnings and continues with an empty
/// result for the failing engine; only exhaustion of every strategy is
/// fatal (see [`ExtractError::NoContentFound`]).
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine's external dependency is not installed or not reachable.
    #[error("{engine} engine unavailable: {detail}")]
    Unavailable { engine: &'static str, detail: String },

    /// The engine ran but reported a failure for this document.
    #[error("{engine} engine failed: {detail}")]
    Failed { engine: &'static str, detail: String },
}

impl EngineError {
    /// Name of the engine that produced this error.
    pub fn engine(&self) -> &'static str {
        match self {
            EngineError::Unavailable { engine, .. } => engine,
            EngineError::Failed { engine, .. } => engine,
        }
    }
}
