//! The batch dispatcher: many documents, isolated failures, input order out.
//!
//! One concurrent task per document, throttled with `buffer_unordered`; each
//! task runs the whole orchestrator on the blocking thread pool, so a slow
//! scan being OCRed never serialises its siblings. Every task resolves to a
//! captured `Result` — isolation is structural: there is no path on which one
//! document's failure can abort collection of the others.
//!
//! Tasks complete in arbitrary order, so each carries its input index and the
//! dispatcher re-associates outcomes by that index — never by completion
//! order — before returning. The returned [`BatchReport`] therefore always
//! has exactly one entry per input path, in input order.
//!
//! ## Cancellation
//!
//! Dropping the future returned by [`extract_batch`] (e.g. from a caller
//! timeout) cancels the batch: queued documents never start, and results of
//! in-flight tasks are discarded. Engine calls already running on the
//! blocking pool cannot be interrupted mid-call — cancellation is "stop
//! waiting", not "interrupt the engine".

use crate::config::ExtractionConfig;
use crate::extract::extract;
use crate::output::{BatchReport, DocumentOutcome};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tracing::info;

/// Extract every document in `paths` concurrently with a shared config.
///
/// Never fails as a whole: each document's terminal error is recorded in its
/// own [`DocumentOutcome`]. Returns once every document has reached a
/// terminal state.
pub async fn extract_batch(paths: &[PathBuf], config: &ExtractionConfig) -> BatchReport {
    let total = paths.len();
    info!(
        "Starting batch extraction: {} documents, concurrency {}",
        total, config.concurrency
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut indexed: Vec<(usize, DocumentOutcome)> =
        stream::iter(paths.iter().cloned().enumerate().map(|(index, path)| {
            let config = config.clone();
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_start(index, total, &path);
                }

                let outcome = extract(&path, &config).await;

                if let Some(ref cb) = config.progress_callback {
                    match &outcome {
                        Ok(report) => cb.on_document_complete(index, total, report),
                        Err(e) => cb.on_document_error(index, total, &path, &e.to_string()),
                    }
                }

                (index, DocumentOutcome { document: path, outcome })
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // Input order, not completion order.
    indexed.sort_by_key(|(index, _)| *index);
    let report = BatchReport {
        documents: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
    };

    let succeeded = report.succeeded().count();
    info!("Batch complete: {}/{} documents succeeded", succeeded, total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    report
}

/// Synchronous wrapper around [`extract_batch`].
///
/// Creates a temporary tokio runtime internally; useful from non-async
/// callers and scripts.
pub fn extract_batch_sync(
    paths: &[PathBuf],
    config: &ExtractionConfig,
) -> Result<BatchReport, crate::error::ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| {
            crate::error::ExtractError::Internal(format!("Failed to create tokio runtime: {e}"))
        })
        .map(|rt| rt.block_on(extract_batch(paths, config)))
}
