//! Integration tests for the extraction orchestrator and batch dispatcher.
//!
//! Engines are replaced with deterministic in-memory stubs injected through
//! `ExtractionConfig`, so these tests exercise the real fallback and
//! isolation logic — chain ordering, flavor retry, per-document error
//! capture, artifact formats — without rendering a single PDF or spawning
//! external binaries. Invocation counters on the stubs prove which engines
//! ran and which were skipped.

use pdfharvest::engines::{
    ImageExtractor, OcrEngine, StructuredParser, TableExtractor, TableFlavor, TextLayerExtractor,
};
use pdfharvest::{
    extract_batch, extract_document, EngineError, ExtractError, ExtractionConfig,
    ExtractionMethod, ExtractionOutcome, ImageArtifact, TabularDataset, TextBlock,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Create a file that passes the orchestrator's `%PDF` magic check.
fn make_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).expect("create test pdf");
    f.write_all(b"%PDF-1.7\n% stub document\n").unwrap();
    path
}

fn sample_tables() -> Vec<TabularDataset> {
    vec![
        TabularDataset::new(
            vec!["Item".into(), "Qty".into()],
            vec![vec!["Bolt".into(), "120".into()], vec!["Washer".into(), "600".into()]],
        ),
        TabularDataset::new(vec!["Name".into()], vec![vec!["only row".into()]]),
    ]
}

// ── Stub engines ─────────────────────────────────────────────────────────────

/// Text layer stub: returns `pages` and counts invocations. A document whose
/// file stem starts with `empty` is reported as textless regardless.
struct StubText {
    pages: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl TextLayerExtractor for StubText {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        if stem.starts_with("empty") {
            return Ok(vec![String::new()]);
        }
        Ok(self.pages.clone())
    }
}

/// Table stub with distinct results per flavor.
struct StubTables {
    primary: Vec<TabularDataset>,
    secondary: Vec<TabularDataset>,
    calls: Arc<AtomicUsize>,
}

impl TableExtractor for StubTables {
    fn extract_tables(
        &self,
        _path: &Path,
        flavor: TableFlavor,
    ) -> Result<Vec<TabularDataset>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match flavor {
            TableFlavor::Whitespace => self.primary.clone(),
            TableFlavor::RuledLines => self.secondary.clone(),
        })
    }
}

/// Table stub that always errors (recoverable).
struct FailingTables;

impl TableExtractor for FailingTables {
    fn extract_tables(
        &self,
        _path: &Path,
        _flavor: TableFlavor,
    ) -> Result<Vec<TabularDataset>, EngineError> {
        Err(EngineError::Failed {
            engine: "table",
            detail: "synthetic failure".into(),
        })
    }
}

struct StubImages {
    artifacts: Vec<ImageArtifact>,
}

impl ImageExtractor for StubImages {
    fn extract_images(
        &self,
        _path: &Path,
        _output_dir: &Path,
    ) -> Result<Vec<ImageArtifact>, EngineError> {
        Ok(self.artifacts.clone())
    }
}

struct FailingImages;

impl ImageExtractor for FailingImages {
    fn extract_images(
        &self,
        _path: &Path,
        _output_dir: &Path,
    ) -> Result<Vec<ImageArtifact>, EngineError> {
        Err(EngineError::Failed {
            engine: "image",
            detail: "synthetic failure".into(),
        })
    }
}

struct StubOcr {
    text: String,
    calls: Arc<AtomicUsize>,
}

impl OcrEngine for StubOcr {
    fn recognize(&self, _path: &Path) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

struct StubStructured {
    blocks: Vec<TextBlock>,
    calls: Arc<AtomicUsize>,
}

impl StructuredParser for StubStructured {
    fn parse(&self, _path: &Path) -> Result<Vec<TextBlock>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.blocks.clone())
    }
}

// ── Config harness ───────────────────────────────────────────────────────────

/// Invocation counters for every stubbed engine.
struct Counters {
    text: Arc<AtomicUsize>,
    tables: Arc<AtomicUsize>,
    ocr: Arc<AtomicUsize>,
    structured: Arc<AtomicUsize>,
}

struct Fixture {
    text_pages: Vec<String>,
    primary_tables: Vec<TabularDataset>,
    secondary_tables: Vec<TabularDataset>,
    ocr_text: String,
    blocks: Vec<TextBlock>,
    images: Vec<ImageArtifact>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            text_pages: vec![],
            primary_tables: vec![],
            secondary_tables: vec![],
            ocr_text: String::new(),
            blocks: vec![],
            images: vec![],
        }
    }
}

impl Fixture {
    fn build(self, method: ExtractionMethod, output_dir: &Path) -> (ExtractionConfig, Counters) {
        let counters = Counters {
            text: Arc::new(AtomicUsize::new(0)),
            tables: Arc::new(AtomicUsize::new(0)),
            ocr: Arc::new(AtomicUsize::new(0)),
            structured: Arc::new(AtomicUsize::new(0)),
        };

        let config = ExtractionConfig::builder()
            .method(method)
            .output_dir(output_dir)
            .text_engine(Arc::new(StubText {
                pages: self.text_pages,
                calls: Arc::clone(&counters.text),
            }))
            .table_engine(Arc::new(StubTables {
                primary: self.primary_tables,
                secondary: self.secondary_tables,
                calls: Arc::clone(&counters.tables),
            }))
            .image_engine(Arc::new(StubImages {
                artifacts: self.images,
            }))
            .ocr_engine(Arc::new(StubOcr {
                text: self.ocr_text,
                calls: Arc::clone(&counters.ocr),
            }))
            .structured_engine(Arc::new(StubStructured {
                blocks: self.blocks,
                calls: Arc::clone(&counters.structured),
            }))
            .build()
            .expect("valid config");

        (config, counters)
    }
}

fn artifact_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter(|e| e.is_ok()).count())
        .unwrap_or(0)
}

// ── Auto-detect fallback chain ───────────────────────────────────────────────

#[test]
fn auto_with_text_layer_never_invokes_ocr_or_structured() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "digital.pdf");
    let out = dir.path().join("out");

    let (config, counters) = Fixture {
        text_pages: vec!["Page one.".into(), "Page two.".into()],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).expect("text layer should win");

    let ExtractionOutcome::TextFound { artifact } = &report.outcome else {
        panic!("expected TextFound, got {:?}", report.outcome);
    };
    assert_eq!(artifact, &out.join("digital.txt"));
    assert_eq!(
        std::fs::read_to_string(artifact).unwrap(),
        "Page one.\nPage two.\n"
    );

    // Steps 3–4 of the chain skipped entirely.
    assert_eq!(counters.ocr.load(Ordering::SeqCst), 0);
    assert_eq!(counters.structured.load(Ordering::SeqCst), 0);
    // Both table flavors were tried and found nothing first.
    assert_eq!(counters.tables.load(Ordering::SeqCst), 2);
    assert_eq!(report.summary.pages_processed, Some(2));
}

#[test]
fn auto_takes_table_branch_even_when_text_layer_exists() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "report.pdf");
    let out = dir.path().join("out");

    let (config, counters) = Fixture {
        text_pages: vec!["There is text too.".into()],
        primary_tables: sample_tables(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).expect("tables should win");

    let ExtractionOutcome::TablesFound { tables, artifacts } = &report.outcome else {
        panic!("expected TablesFound, got {:?}", report.outcome);
    };
    assert_eq!(*tables, 2);
    assert_eq!(artifacts[0], out.join("report_table_1.xlsx"));
    assert_eq!(artifacts[1], out.join("report_table_2.xlsx"));
    assert!(artifacts.iter().all(|p| p.exists()));

    // Tables are step 1: nothing else ran.
    assert_eq!(counters.text.load(Ordering::SeqCst), 0);
    assert_eq!(counters.ocr.load(Ordering::SeqCst), 0);
    assert_eq!(counters.structured.load(Ordering::SeqCst), 0);
    assert_eq!(report.summary.tables_found, 2);
}

#[test]
fn auto_retries_secondary_flavor_before_declaring_tables_empty() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "ruled.pdf");
    let out = dir.path().join("out");

    let (config, counters) = Fixture {
        secondary_tables: sample_tables(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).expect("secondary flavor should win");

    assert!(matches!(
        report.outcome,
        ExtractionOutcome::TablesFound { tables: 2, .. }
    ));
    // Primary flavor first, then the secondary.
    assert_eq!(counters.tables.load(Ordering::SeqCst), 2);
}

#[test]
fn auto_falls_back_to_ocr_and_never_reaches_structured() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "scan.pdf");
    let out = dir.path().join("out");

    let (config, counters) = Fixture {
        text_pages: vec![String::new(), String::new()],
        ocr_text: "Recognised by OCR.".into(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).expect("OCR should win");

    let ExtractionOutcome::OcrTextFound { artifact } = &report.outcome else {
        panic!("expected OcrTextFound, got {:?}", report.outcome);
    };
    assert_eq!(artifact, &out.join("scan_ocr.txt"));
    assert_eq!(counters.ocr.load(Ordering::SeqCst), 1);
    assert_eq!(counters.structured.load(Ordering::SeqCst), 0);
}

#[test]
fn auto_reaches_structured_parser_as_last_resort() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "odd.pdf");
    let out = dir.path().join("out");

    let (config, _counters) = Fixture {
        blocks: vec![
            TextBlock::new("Heading", Some("Title".into())),
            TextBlock::new("Some prose.", Some("NarrativeText".into())),
        ],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).expect("structured should win");

    let ExtractionOutcome::StructuredFound { blocks, artifact } = &report.outcome else {
        panic!("expected StructuredFound, got {:?}", report.outcome);
    };
    assert_eq!(*blocks, 2);
    assert_eq!(
        std::fs::read_to_string(artifact).unwrap(),
        "[Title] Heading\n\n[NarrativeText] Some prose."
    );
}

#[test]
fn auto_exhausted_chain_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "blank.pdf");
    let out = dir.path().join("out");

    let (config, _counters) = Fixture::default().build(ExtractionMethod::Auto, &out);

    let err = extract_document(&pdf, &config).expect_err("everything is empty");
    assert!(matches!(
        err,
        ExtractError::NoContentFound { method: ExtractionMethod::Auto, ref path } if path == &pdf
    ));
    // No artifact files were created.
    assert_eq!(artifact_count(&out), 0);
}

#[test]
fn engine_failure_is_absorbed_and_chain_continues() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "flaky.pdf");
    let out = dir.path().join("out");

    let (mut config, counters) = Fixture {
        text_pages: vec!["Still extractable.".into()],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);
    config.table_engine = Arc::new(FailingTables);

    let report = extract_document(&pdf, &config).expect("text layer should still win");
    assert!(matches!(report.outcome, ExtractionOutcome::TextFound { .. }));
    assert_eq!(counters.text.load(Ordering::SeqCst), 1);
}

#[test]
fn image_extraction_failure_never_affects_the_primary_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "imgfail.pdf");
    let out = dir.path().join("out");

    let (mut config, _counters) = Fixture {
        text_pages: vec!["Text survives.".into()],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);
    config.image_engine = Arc::new(FailingImages);

    let report = extract_document(&pdf, &config).expect("image failure is soft");
    assert!(matches!(report.outcome, ExtractionOutcome::TextFound { .. }));
    assert!(report.images.is_empty());
    assert_eq!(report.summary.images_saved, 0);
}

#[test]
fn images_are_reported_alongside_the_primary_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "illustrated.pdf");
    let out = dir.path().join("out");

    let images = vec![
        ImageArtifact {
            path: out.join("illustrated_page1_img1.png"),
            page: 1,
            index: 1,
        },
        ImageArtifact {
            path: out.join("illustrated_page2_img1.png"),
            page: 2,
            index: 1,
        },
    ];
    let (config, _counters) = Fixture {
        text_pages: vec!["Body.".into()],
        images,
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_document(&pdf, &config).unwrap();
    assert_eq!(report.images.len(), 2);
    assert_eq!(report.summary.images_saved, 2);
    // Paths are unique per (document, page, index).
    let unique: std::collections::HashSet<_> = report.images.iter().map(|i| &i.path).collect();
    assert_eq!(unique.len(), 2);
}

// ── Pinned methods ───────────────────────────────────────────────────────────

#[test]
fn pinned_csv_with_no_tables_fails_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "prose.pdf");
    let out = dir.path().join("out");

    // Text and OCR would succeed — pinned csv must not use them.
    let (config, counters) = Fixture {
        text_pages: vec!["Plenty of text.".into()],
        ocr_text: "OCR text.".into(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::TablesCsv, &out);

    let err = extract_document(&pdf, &config).expect_err("no tables, no csv");
    assert!(matches!(
        err,
        ExtractError::NoContentFound { method: ExtractionMethod::TablesCsv, .. }
    ));
    assert_eq!(counters.text.load(Ordering::SeqCst), 0);
    assert_eq!(counters.ocr.load(Ordering::SeqCst), 0);
}

#[test]
fn pinned_csv_writes_one_separator_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "ledger.pdf");
    let out = dir.path().join("out");

    let (config, _counters) = Fixture {
        primary_tables: sample_tables(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::TablesCsv, &out);

    let report = extract_document(&pdf, &config).unwrap();
    let ExtractionOutcome::TablesFound { artifacts, .. } = &report.outcome else {
        panic!("expected TablesFound");
    };
    assert_eq!(artifacts, &vec![out.join("ledger_tables.csv")]);

    let body = std::fs::read_to_string(&artifacts[0]).unwrap();
    assert!(body.starts_with("--- Table 1 ---\n"));
    assert!(body.contains("--- Table 2 ---\n"));
    assert_eq!(body.matches("--- Table ").count(), 2);
}

#[test]
fn pinned_json_round_trips_rows_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "ledger.pdf");
    let out = dir.path().join("out");

    let (config, _counters) = Fixture {
        primary_tables: sample_tables(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::TablesJson, &out);

    let report = extract_document(&pdf, &config).unwrap();
    let artifact = out.join("ledger_tables.json");
    assert_eq!(report.outcome.artifacts(), vec![&artifact]);

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    let outer = parsed.as_array().unwrap();
    assert_eq!(outer.len(), 2);
    assert_eq!(outer[0].as_array().unwrap().len(), 2);
    assert_eq!(outer[0][0]["Item"], "Bolt");
    assert_eq!(outer[0][1]["Qty"], "600");
    assert_eq!(outer[1][0]["Name"], "only row");
}

#[test]
fn pinned_txt_does_not_fall_back_to_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "empty_scan.pdf");
    let out = dir.path().join("out");

    // The stub reports `empty_*` documents as textless; OCR would succeed.
    let (config, counters) = Fixture {
        ocr_text: "OCR would find this.".into(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::Text, &out);

    let err = extract_document(&pdf, &config).expect_err("no text layer");
    assert!(matches!(
        err,
        ExtractError::NoContentFound { method: ExtractionMethod::Text, .. }
    ));
    assert_eq!(counters.ocr.load(Ordering::SeqCst), 0);
}

#[test]
fn pinned_excel_writes_one_spreadsheet_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = make_pdf(dir.path(), "fin.pdf");
    let out = dir.path().join("out");

    let (config, _counters) = Fixture {
        primary_tables: sample_tables(),
        ..Fixture::default()
    }
    .build(ExtractionMethod::TablesExcel, &out);

    let report = extract_document(&pdf, &config).unwrap();
    let ExtractionOutcome::TablesFound { artifacts, tables } = &report.outcome else {
        panic!("expected TablesFound");
    };
    assert_eq!(*tables, 2);
    assert_eq!(artifacts.len(), 2);
    assert!(artifacts.iter().all(|p| p.exists()));
}

// ── Batch dispatcher ─────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_isolates_failures_and_preserves_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let a = make_pdf(dir.path(), "a.pdf");
    let b = make_pdf(dir.path(), "empty_b.pdf"); // textless → NoContentFound
    let c = make_pdf(dir.path(), "c.pdf");

    let (config, _counters) = Fixture {
        text_pages: vec!["Document text.".into()],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let paths = vec![a.clone(), b.clone(), c.clone()];
    let report = extract_batch(&paths, &config).await;

    // Cardinality equals the input count, order preserved.
    assert_eq!(report.len(), 3);
    assert_eq!(report.documents[0].document, a);
    assert_eq!(report.documents[1].document, b);
    assert_eq!(report.documents[2].document, c);

    assert!(report.documents[0].is_success());
    assert!(report.documents[2].is_success());
    assert!(matches!(
        report.documents[1].outcome,
        Err(ExtractError::NoContentFound { .. })
    ));
    assert_eq!(report.succeeded().count(), 2);
}

#[tokio::test]
async fn batch_writes_disjoint_artifacts_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let paths: Vec<PathBuf> = (1..=4)
        .map(|i| make_pdf(dir.path(), &format!("doc{i}.pdf")))
        .collect();

    let (config, _counters) = Fixture {
        text_pages: vec!["Shared stub text.".into()],
        ..Fixture::default()
    }
    .build(ExtractionMethod::Auto, &out);

    let report = extract_batch(&paths, &config).await;
    assert_eq!(report.succeeded().count(), 4);

    for i in 1..=4 {
        assert!(out.join(format!("doc{i}.txt")).exists());
    }
}
