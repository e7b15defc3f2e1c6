//! Progress-callback trait for per-document batch events.
//!
//! Inject an `Arc<dyn BatchProgressCallback>` via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! real-time events as the batch dispatcher works through its documents.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a database record, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because documents are extracted
//! concurrently; implementations must protect shared mutable state with
//! appropriate synchronisation primitives (e.g. `Mutex`, `AtomicUsize`).

use crate::output::ExtractionReport;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch dispatcher as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is the document's position in the input
/// order (0-based), which is also its position in the final
/// [`crate::BatchReport`].
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is dispatched.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document's extraction task begins.
    fn on_document_start(&self, index: usize, total: usize, document: &Path) {
        let _ = (index, total, document);
    }

    /// Called when a document produced an artifact.
    fn on_document_complete(&self, index: usize, total: usize, report: &ExtractionReport) {
        let _ = (index, total, report);
    }

    /// Called when a document's extraction recorded a terminal error.
    fn on_document_error(&self, index: usize, total: usize, document: &Path, error: &str) {
        let _ = (index, total, document, error);
    }

    /// Called once after every document reached a terminal state.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
