//! CLI binary for pdfharvest.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints per-document results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfharvest::{
    extract_batch, BatchProgressCallback, ExtractionConfig, ExtractionMethod, ExtractionOutcome,
    ExtractionReport, ProgressCallback,
};
use pdfharvest::engines::TesseractOcr;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-document
/// log lines using [indicatif]. Designed to work correctly when documents
/// complete out-of-order (concurrent batch mode).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-document wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of documents that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} docs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

/// One-line description of what a run produced.
fn describe_outcome(report: &ExtractionReport) -> String {
    match &report.outcome {
        ExtractionOutcome::TablesFound { tables, artifacts } => {
            format!("{} tables → {} files", tables, artifacts.len())
        }
        ExtractionOutcome::TextFound { artifact } => {
            format!("text → {}", artifact.display())
        }
        ExtractionOutcome::OcrTextFound { artifact } => {
            format!("OCR text → {}", artifact.display())
        }
        ExtractionOutcome::StructuredFound { blocks, artifact } => {
            format!("{} blocks → {}", blocks, artifact.display())
        }
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize, document: &Path) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(format!("{}", document.display()));
    }

    fn on_document_complete(&self, index: usize, total: usize, report: &ExtractionReport) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            index + 1,
            total,
            report.document.display(),
            dim(&describe_outcome(report)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, document: &Path, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = if first_line.len() > 80 {
            format!("{}\u{2026}", &first_line[..79])
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index + 1,
            total,
            document.display(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents extracted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Auto-detect the best strategy per document
  pdfharvest report.pdf

  # A whole directory's worth of documents, 8 at a time
  pdfharvest invoices/*.pdf -c 8 -o extracted/

  # Tables only, as CSV (fails if the document has no tables)
  pdfharvest --method csv financials.pdf

  # Tables only, one spreadsheet per table
  pdfharvest --method excel financials.pdf

  # Structured blocks ([Title] / [NarrativeText] / [ListItem] lines)
  pdfharvest --method unstructured thesis.pdf

  # German OCR with a custom tesseract install
  pdfharvest --ocr-command /opt/tesseract/bin/tesseract --ocr-language deu scan.pdf

  # Machine-readable batch report
  pdfharvest --json *.pdf > report.json

METHODS:
  auto          tables → text layer → OCR → structured parsing (default)
  txt           embedded text layer only
  csv           tables only, single CSV with --- Table N --- separators
  json          tables only, single JSON array
  excel         tables only, one .xlsx per table
  unstructured  categorised content blocks

ARTIFACTS (per document, in the output directory):
  <base>.txt               text layer        <base>_tables.csv    tables, CSV
  <base>_ocr.txt           OCR text          <base>_tables.json   tables, JSON
  <base>_structured.txt    blocks            <base>_table_<n>.xlsx one per table
  <base>_page<p>_img<i>.png embedded images (always attempted)

ENVIRONMENT VARIABLES:
  PDFHARVEST_OUTPUT_DIR    Default output directory
  PDFHARVEST_METHOD        Default extraction method
  PDFHARVEST_CONCURRENCY   Default batch concurrency
  PDFHARVEST_OCR_COMMAND   Tesseract executable (name or path)
  PDFHARVEST_OCR_LANGUAGE  Tesseract language code (default: eng)

SETUP:
  OCR needs the tesseract binary on PATH (apt install tesseract-ocr /
  brew install tesseract). Everything else works out of the box.
"#;

/// Extract text, tables, and images from PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdfharvest",
    version,
    about = "Extract text, tables, and images from PDF documents",
    long_about = "Extract content from PDF documents into text, CSV/JSON/XLSX tables, or \
structured-block artifacts. Picks the best strategy automatically per document (tables, \
embedded text layer, OCR, structured parsing) and processes batches concurrently with \
per-document failure isolation.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One or more PDF files to extract.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory artifacts are written to.
    #[arg(short, long, env = "PDFHARVEST_OUTPUT_DIR", default_value = "extracted_output")]
    output_dir: PathBuf,

    /// Extraction method: auto, txt, csv, json, excel, unstructured.
    #[arg(short, long, env = "PDFHARVEST_METHOD", default_value = "auto")]
    method: String,

    /// Number of documents extracted concurrently.
    #[arg(short, long, env = "PDFHARVEST_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Tesseract executable used for OCR (name or full path).
    #[arg(long, env = "PDFHARVEST_OCR_COMMAND", default_value = "tesseract")]
    ocr_command: String,

    /// Tesseract language code passed as -l.
    #[arg(long, env = "PDFHARVEST_OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    /// Output the batch report as JSON instead of log lines.
    #[arg(long, env = "PDFHARVEST_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFHARVEST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFHARVEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFHARVEST_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let method: ExtractionMethod = cli.method.parse()?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let ocr = TesseractOcr::new()
        .with_command(cli.ocr_command.as_str())
        .with_language(cli.ocr_language.as_str());

    let mut builder = ExtractionConfig::builder()
        .method(method)
        .output_dir(&cli.output_dir)
        .concurrency(cli.concurrency)
        .ocr_engine(Arc::new(ocr));

    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the batch ────────────────────────────────────────────────────
    let report = extract_batch(&cli.inputs, &config).await;
    let failed = report.failed().count();

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    } else if !cli.quiet && !show_progress {
        // Plain log mode (the callback already printed in progress mode).
        for doc in &report.documents {
            match &doc.outcome {
                Ok(r) => eprintln!("{}: {}", doc.document.display(), describe_outcome(r)),
                Err(e) => eprintln!("{}: {}", doc.document.display(), e),
            }
        }
        eprintln!(
            "Extracted {}/{} documents",
            report.succeeded().count(),
            report.len()
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
