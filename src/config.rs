//! Configuration types for PDF content extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a single configuration across a whole batch and to
//! swap any extraction engine for an alternative implementation (or a test
//! stub) without touching orchestrator logic.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::engines::{
    HeuristicTableExtractor, ImageExtractor, LayoutStructuredParser, OcrEngine,
    PdfiumImageExtractor, PdfiumTextExtractor, StructuredParser, TableExtractor, TesseractOcr,
    TextLayerExtractor,
};
use crate::error::ExtractError;
use crate::progress::BatchProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// The requested extraction method.
///
/// The string forms (`auto`, `txt`, `csv`, `json`, `excel`, `unstructured`)
/// are the exact external vocabulary callers pass on the command line or over
/// an API; anything else fails with [`ExtractError::UnsupportedMethod`].
///
/// Every method except [`Auto`](Self::Auto) pins a single engine: if that
/// engine yields no content the extraction fails immediately, with no
/// cross-method fallback. `Auto` walks the fallback chain
/// tables → text layer → OCR → structured parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Try tables, then the text layer, then OCR, then structured parsing.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// Text layer only → `<base>.txt`.
    #[serde(rename = "txt")]
    Text,
    /// Tables only, CSV artifact → `<base>_tables.csv`.
    #[serde(rename = "csv")]
    TablesCsv,
    /// Tables only, JSON artifact → `<base>_tables.json`.
    #[serde(rename = "json")]
    TablesJson,
    /// Tables only, one spreadsheet per table → `<base>_table_<n>.xlsx`.
    #[serde(rename = "excel")]
    TablesExcel,
    /// Structured parsing only → `<base>_structured.txt`.
    #[serde(rename = "unstructured")]
    Structured,
}

impl ExtractionMethod {
    /// The external token for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Auto => "auto",
            ExtractionMethod::Text => "txt",
            ExtractionMethod::TablesCsv => "csv",
            ExtractionMethod::TablesJson => "json",
            ExtractionMethod::TablesExcel => "excel",
            ExtractionMethod::Structured => "unstructured",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ExtractionMethod::Auto),
            "txt" => Ok(ExtractionMethod::Text),
            "csv" => Ok(ExtractionMethod::TablesCsv),
            "json" => Ok(ExtractionMethod::TablesJson),
            "excel" => Ok(ExtractionMethod::TablesExcel),
            "unstructured" => Ok(ExtractionMethod::Structured),
            other => Err(ExtractError::UnsupportedMethod {
                given: other.to_string(),
            }),
        }
    }
}

/// Configuration for extracting one document or a whole batch.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfharvest::{ExtractionConfig, ExtractionMethod};
///
/// let config = ExtractionConfig::builder()
///     .method(ExtractionMethod::Auto)
///     .output_dir("extracted_output")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Requested extraction method. Default: [`ExtractionMethod::Auto`].
    pub method: ExtractionMethod,

    /// Directory all artifacts are written to. Default: `extracted_output`.
    ///
    /// Created on demand. Concurrent batch tasks write to distinct files here
    /// (filenames derive from each document's base name), so no locking is
    /// needed.
    pub output_dir: PathBuf,

    /// Number of documents extracted concurrently in batch mode. Default: 4.
    ///
    /// Each document runs on the blocking thread pool (engine calls are CPU-
    /// and I/O-bound), so values far above the core count buy nothing.
    pub concurrency: usize,

    /// Text-layer engine. Default: pdfium-backed.
    pub text_engine: Arc<dyn TextLayerExtractor>,

    /// Table-detection engine. Default: layout heuristics over the text layer.
    pub table_engine: Arc<dyn TableExtractor>,

    /// Embedded-image engine. Default: pdfium page-object export.
    pub image_engine: Arc<dyn ImageExtractor>,

    /// OCR engine. Default: pdfium rasterisation + system `tesseract`.
    pub ocr_engine: Arc<dyn OcrEngine>,

    /// Structured parser of last resort. Default: layout-based block
    /// categorisation.
    pub structured_engine: Arc<dyn StructuredParser>,

    /// Per-document progress events for batch runs. Default: none.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::Auto,
            output_dir: PathBuf::from("extracted_output"),
            concurrency: 4,
            text_engine: Arc::new(PdfiumTextExtractor::new()),
            table_engine: Arc::new(HeuristicTableExtractor::new()),
            image_engine: Arc::new(PdfiumImageExtractor::new()),
            ocr_engine: Arc::new(TesseractOcr::new()),
            structured_engine: Arc::new(LayoutStructuredParser::new()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("method", &self.method)
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("text_engine", &"<dyn TextLayerExtractor>")
            .field("table_engine", &"<dyn TableExtractor>")
            .field("image_engine", &"<dyn ImageExtractor>")
            .field("ocr_engine", &"<dyn OcrEngine>")
            .field("structured_engine", &"<dyn StructuredParser>")
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn method(mut self, method: ExtractionMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn text_engine(mut self, engine: Arc<dyn TextLayerExtractor>) -> Self {
        self.config.text_engine = engine;
        self
    }

    pub fn table_engine(mut self, engine: Arc<dyn TableExtractor>) -> Self {
        self.config.table_engine = engine;
        self
    }

    pub fn image_engine(mut self, engine: Arc<dyn ImageExtractor>) -> Self {
        self.config.image_engine = engine;
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = engine;
        self
    }

    pub fn structured_engine(mut self, engine: Arc<dyn StructuredParser>) -> Self {
        self.config.structured_engine = engine;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
