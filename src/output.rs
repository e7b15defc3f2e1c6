//! Result types returned by the extraction orchestrator and batch dispatcher.
//!
//! [`ExtractionReport`] describes what a single successful run produced:
//! which strategy won, where the artifacts landed, and the run summary.
//! [`BatchReport`] collects one [`DocumentOutcome`] per input document, in
//! input order, whether that document succeeded or failed — a failing
//! document yields a recorded error, never a missing entry.

use crate::error::ExtractError;
use crate::model::ImageArtifact;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// The orchestrator's final decision for one document.
///
/// Exactly one variant is produced per run. The "no content" case is not a
/// variant: it is terminal and surfaces as
/// [`ExtractError::NoContentFound`](crate::ExtractError::NoContentFound).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// Tables were detected; one spreadsheet artifact per table (`auto` /
    /// `excel`), or a single CSV/JSON artifact for the pinned methods.
    TablesFound {
        artifacts: Vec<PathBuf>,
        tables: usize,
    },
    /// The embedded text layer was non-empty.
    TextFound { artifact: PathBuf },
    /// OCR over rasterised pages recognised non-empty text.
    OcrTextFound { artifact: PathBuf },
    /// The structured parser produced categorised blocks.
    StructuredFound { artifact: PathBuf, blocks: usize },
}

impl ExtractionOutcome {
    /// All artifact paths this outcome produced, in creation order.
    pub fn artifacts(&self) -> Vec<&PathBuf> {
        match self {
            ExtractionOutcome::TablesFound { artifacts, .. } => artifacts.iter().collect(),
            ExtractionOutcome::TextFound { artifact }
            | ExtractionOutcome::OcrTextFound { artifact }
            | ExtractionOutcome::StructuredFound { artifact, .. } => vec![artifact],
        }
    }
}

/// Human-readable run summary, also emitted as a `tracing` event after every
/// run (success or failure) — observability only, not part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    /// Page count, known only when an engine that enumerates pages ran
    /// (the text layer). `None` when e.g. `auto` stopped at the table step.
    pub pages_processed: Option<usize>,
    pub tables_found: usize,
    pub images_saved: usize,
}

/// Successful result of extracting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// The input document.
    pub document: PathBuf,
    /// Base name used for all artifact filenames.
    pub base_name: String,
    /// Which strategy produced content, and where.
    pub outcome: ExtractionOutcome,
    /// Images exported alongside the primary artifact (may be empty; image
    /// extraction failure never fails the run).
    pub images: Vec<ImageArtifact>,
    pub summary: ExtractionSummary,
}

/// Result of one document within a batch: the report, or the error recorded
/// against this document alone.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub document: PathBuf,
    pub outcome: Result<ExtractionReport, ExtractError>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

// Errors are rendered as display strings so a batch report is always
// serialisable for `--json` output.
impl Serialize for DocumentOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DocumentOutcome", 2)?;
        s.serialize_field("document", &self.document)?;
        match &self.outcome {
            Ok(report) => s.serialize_field("report", report)?,
            Err(err) => s.serialize_field("error", &err.to_string())?,
        }
        s.end()
    }
}

/// All per-document outcomes of a batch run, in input order.
///
/// `documents.len()` always equals the number of input paths, regardless of
/// how many documents failed.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents that produced an artifact.
    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.documents.iter().filter(|d| d.is_success())
    }

    /// Documents that recorded an error.
    pub fn failed(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.documents.iter().filter(|d| !d.is_success())
    }
}
