//! The extraction orchestrator: run engines in order, decide what won.
//!
//! ## The fallback chain
//!
//! For `auto`, strategies are an explicit ordered list — tables, text layer,
//! OCR, structured parsing — walked until the first one yields content. Each
//! step returns `Ok(Some(outcome))`, `Ok(None)` for "ran but found nothing",
//! or a recoverable [`EngineError`] which is logged as a warning and treated
//! exactly like an empty result. Only exhausting every step is fatal
//! ([`ExtractError::NoContentFound`]); only a failed artifact write
//! short-circuits the chain.
//!
//! Pinned methods (`txt`, `csv`, `json`, `excel`, `unstructured`) invoke the
//! single corresponding engine and fail immediately when it comes back
//! empty — no cross-method fallback.
//!
//! Image extraction always runs once per document before the primary
//! strategy, fails soft, and its artifacts ride along in the report.
//!
//! ## Blocking
//!
//! Engine calls are blocking (file I/O, rasterisation, child processes), so
//! the core is the synchronous [`extract_document`]; the async [`extract`]
//! wrapper moves the whole run onto the blocking thread pool, which is what
//! lets the batch dispatcher overlap many documents without stalling the
//! runtime.

use crate::config::{ExtractionConfig, ExtractionMethod};
use crate::engines::TableFlavor;
use crate::error::{EngineError, ExtractError};
use crate::model::{TabularDataset, TextBlock};
use crate::output::{ExtractionOutcome, ExtractionReport, ExtractionSummary};
use crate::writer;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract one document asynchronously.
///
/// Runs [`extract_document`] on the blocking thread pool. This is the entry
/// point the batch dispatcher uses; call it directly for single documents in
/// async contexts.
///
/// # Errors
/// Returns `Err(ExtractError)` for terminal conditions only: bad input,
/// unsupported method, nothing extractable, or a failed artifact write.
/// Engine failures are absorbed (logged, treated as empty) per strategy.
pub async fn extract(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionReport, ExtractError> {
    let path = path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || extract_document(&path, &config))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {e}")))?
}

/// Extract one document, blocking the calling thread.
///
/// Produces exactly one primary artifact (or one spreadsheet per table) in
/// `config.output_dir` and returns a report describing it. A human-readable
/// summary event is emitted after every run, success or failure.
pub fn extract_document(
    path: &Path,
    config: &ExtractionConfig,
) -> Result<ExtractionReport, ExtractError> {
    info!(
        "Starting extraction: '{}' (method: {})",
        path.display(),
        config.method
    );

    // ── Step 1: Validate input ───────────────────────────────────────────
    validate_input(path)?;

    // ── Step 2: Prepare output directory ─────────────────────────────────
    std::fs::create_dir_all(&config.output_dir).map_err(|e| ExtractError::WriteFailure {
        path: config.output_dir.clone(),
        detail: e.to_string(),
    })?;
    let base_name = writer::document_base_name(path);

    // ── Step 3: Images — always attempted, never fatal ───────────────────
    let images = match config.image_engine.extract_images(path, &config.output_dir) {
        Ok(images) => {
            if !images.is_empty() {
                info!("Extracted {} embedded images", images.len());
            }
            images
        }
        Err(e) => {
            warn!("Image extraction failed: {e}");
            Vec::new()
        }
    };

    // ── Step 4: Run the requested method ─────────────────────────────────
    let mut run = StrategyRun {
        path,
        base_name: &base_name,
        config,
        summary: ExtractionSummary {
            images_saved: images.len(),
            ..ExtractionSummary::default()
        },
    };
    let result = run.execute();
    let summary = run.summary;

    // ── Step 5: Summary — emitted on success and failure alike ───────────
    let pages = summary
        .pages_processed
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!(
        "Extraction summary for '{}': pages={} tables={} images={}",
        path.display(),
        pages,
        summary.tables_found,
        summary.images_saved
    );

    result.map(|outcome| ExtractionReport {
        document: path.to_path_buf(),
        base_name,
        outcome,
        images,
        summary,
    })
}

/// Validate that the input exists, is readable, and carries the PDF magic.
fn validate_input(path: &Path) -> Result<(), ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

// ── Strategies ───────────────────────────────────────────────────────────

/// One step of the auto-detect fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Tables,
    TextLayer,
    Ocr,
    Structured,
}

impl Strategy {
    /// The auto-detect order. Tables win over an existing text layer, OCR is
    /// tried only when cheaper strategies found nothing, structured parsing
    /// is the last resort.
    const AUTO_CHAIN: [Strategy; 4] = [
        Strategy::Tables,
        Strategy::TextLayer,
        Strategy::Ocr,
        Strategy::Structured,
    ];

    fn name(&self) -> &'static str {
        match self {
            Strategy::Tables => "tables",
            Strategy::TextLayer => "text-layer",
            Strategy::Ocr => "ocr",
            Strategy::Structured => "structured",
        }
    }
}

/// Why a strategy step did not produce an outcome.
///
/// `Recoverable` keeps the chain walking; `Fatal` (write failures) stops it.
enum StepFailure {
    Recoverable(EngineError),
    Fatal(ExtractError),
}

impl From<EngineError> for StepFailure {
    fn from(e: EngineError) -> Self {
        StepFailure::Recoverable(e)
    }
}

impl From<ExtractError> for StepFailure {
    fn from(e: ExtractError) -> Self {
        StepFailure::Fatal(e)
    }
}

/// Execution state for one document: engines, naming, running summary.
struct StrategyRun<'a> {
    path: &'a Path,
    base_name: &'a str,
    config: &'a ExtractionConfig,
    summary: ExtractionSummary,
}

impl StrategyRun<'_> {
    fn execute(&mut self) -> Result<ExtractionOutcome, ExtractError> {
        match self.config.method {
            ExtractionMethod::Auto => self.run_auto_chain(),
            ExtractionMethod::Text => self.run_pinned_text(),
            ExtractionMethod::TablesCsv
            | ExtractionMethod::TablesJson
            | ExtractionMethod::TablesExcel => self.run_pinned_tables(),
            ExtractionMethod::Structured => self.run_pinned_structured(),
        }
    }

    /// Walk the fallback chain, stopping at the first non-empty outcome.
    fn run_auto_chain(&mut self) -> Result<ExtractionOutcome, ExtractError> {
        for strategy in Strategy::AUTO_CHAIN {
            debug!("auto: trying {} strategy", strategy.name());
            match self.attempt(strategy) {
                Ok(Some(outcome)) => {
                    info!("auto: {} strategy produced content", strategy.name());
                    return Ok(outcome);
                }
                Ok(None) => debug!("auto: {} strategy found nothing", strategy.name()),
                Err(StepFailure::Recoverable(e)) => {
                    warn!("auto: {} strategy failed, trying next: {e}", strategy.name());
                }
                Err(StepFailure::Fatal(e)) => return Err(e),
            }
        }

        Err(self.no_content())
    }

    /// Run one chain step: gather the payload, and on non-empty content
    /// write the artifact(s) and return the outcome.
    fn attempt(&mut self, strategy: Strategy) -> Result<Option<ExtractionOutcome>, StepFailure> {
        match strategy {
            Strategy::Tables => {
                let tables = self.tables_with_flavor_fallback()?;
                if tables.is_empty() {
                    return Ok(None);
                }
                let artifacts = writer::write_tables_excel(
                    &tables,
                    &self.config.output_dir,
                    self.base_name,
                )?;
                Ok(Some(ExtractionOutcome::TablesFound {
                    tables: tables.len(),
                    artifacts,
                }))
            }
            Strategy::TextLayer => {
                let text = self.text_layer()?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let artifact = writer::text_artifact_path(&self.config.output_dir, self.base_name);
                writer::write_text(&text, &artifact)?;
                Ok(Some(ExtractionOutcome::TextFound { artifact }))
            }
            Strategy::Ocr => {
                let text = self.config.ocr_engine.recognize(self.path)?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let artifact = writer::ocr_artifact_path(&self.config.output_dir, self.base_name);
                writer::write_text(&text, &artifact)?;
                Ok(Some(ExtractionOutcome::OcrTextFound { artifact }))
            }
            Strategy::Structured => {
                let blocks = self.config.structured_engine.parse(self.path)?;
                let rendered = render_blocks(&blocks);
                if rendered.trim().is_empty() {
                    return Ok(None);
                }
                let artifact =
                    writer::structured_artifact_path(&self.config.output_dir, self.base_name);
                writer::write_text(&rendered, &artifact)?;
                Ok(Some(ExtractionOutcome::StructuredFound {
                    blocks: blocks.len(),
                    artifact,
                }))
            }
        }
    }

    // ── Pinned methods: one engine, no cross-method fallback ─────────────

    fn run_pinned_text(&mut self) -> Result<ExtractionOutcome, ExtractError> {
        let text = match self.text_layer() {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed: {e}");
                String::new()
            }
        };
        if text.trim().is_empty() {
            return Err(self.no_content());
        }
        let artifact = writer::text_artifact_path(&self.config.output_dir, self.base_name);
        writer::write_text(&text, &artifact)?;
        Ok(ExtractionOutcome::TextFound { artifact })
    }

    fn run_pinned_tables(&mut self) -> Result<ExtractionOutcome, ExtractError> {
        let tables = match self.tables_with_flavor_fallback() {
            Ok(tables) => tables,
            Err(e) => {
                warn!("Table extraction failed: {e}");
                Vec::new()
            }
        };
        if tables.is_empty() {
            return Err(self.no_content());
        }

        let artifacts = match self.config.method {
            ExtractionMethod::TablesCsv => {
                let path = writer::csv_artifact_path(&self.config.output_dir, self.base_name);
                writer::write_tables_csv(&tables, &path)?;
                vec![path]
            }
            ExtractionMethod::TablesJson => {
                let path = writer::json_artifact_path(&self.config.output_dir, self.base_name);
                writer::write_tables_json(&tables, &path)?;
                vec![path]
            }
            ExtractionMethod::TablesExcel => {
                writer::write_tables_excel(&tables, &self.config.output_dir, self.base_name)?
            }
            // execute() routes only table methods here.
            _ => unreachable!("pinned table run with non-table method"),
        };

        Ok(ExtractionOutcome::TablesFound {
            tables: tables.len(),
            artifacts,
        })
    }

    fn run_pinned_structured(&mut self) -> Result<ExtractionOutcome, ExtractError> {
        let blocks = self.absorb(self.config.structured_engine.parse(self.path), Vec::new);
        let rendered = render_blocks(&blocks);
        if rendered.trim().is_empty() {
            return Err(self.no_content());
        }
        let artifact = writer::structured_artifact_path(&self.config.output_dir, self.base_name);
        writer::write_text(&rendered, &artifact)?;
        Ok(ExtractionOutcome::StructuredFound {
            blocks: blocks.len(),
            artifact,
        })
    }

    // ── Engine access helpers ────────────────────────────────────────────

    /// Primary flavor first; retry with the secondary only when the primary
    /// reports zero tables. An error from either flavor is recoverable.
    fn tables_with_flavor_fallback(&mut self) -> Result<Vec<TabularDataset>, EngineError> {
        for flavor in TableFlavor::DETECTION_ORDER {
            let tables = self.config.table_engine.extract_tables(self.path, flavor)?;
            if !tables.is_empty() {
                self.summary.tables_found = tables.len();
                return Ok(tables);
            }
            debug!("{:?} table flavor found nothing", flavor);
        }
        Ok(Vec::new())
    }

    /// Page texts concatenated with a separating line break; records the
    /// page count in the summary.
    fn text_layer(&mut self) -> Result<String, EngineError> {
        let pages = self.config.text_engine.extract_text(self.path)?;
        self.summary.pages_processed = Some(pages.len());
        Ok(concatenate_pages(&pages))
    }

    fn no_content(&self) -> ExtractError {
        ExtractError::NoContentFound {
            path: self.path.to_path_buf(),
            method: self.config.method,
        }
    }

    /// Absorb a recoverable engine failure: log it, substitute empty.
    fn absorb<T>(
        &self,
        result: Result<T, EngineError>,
        empty: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(v) => v,
            Err(e) => {
                warn!("{} engine failed, treating as empty: {e}", e.engine());
                empty()
            }
        }
    }
}

/// Join per-page texts with a separating line break, skipping textless pages.
fn concatenate_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        if page.trim().is_empty() {
            continue;
        }
        text.push_str(page);
        if !page.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}

/// Render structured blocks as `[category] text` lines separated by blank
/// lines, skipping blocks with no visible text.
fn render_blocks(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| !b.text.trim().is_empty())
        .map(TextBlock::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
