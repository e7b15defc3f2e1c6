//! OCR via pdfium rasterisation and the system `tesseract` binary.
//!
//! ## Why shell out?
//!
//! Tesseract is the de-facto standard OCR engine and is packaged everywhere;
//! invoking the binary keeps this crate free of C library bindings while the
//! [`OcrEngine`] trait leaves the door open for in-process backends. The
//! binary is probed lazily — a missing install surfaces as a recoverable
//! [`EngineError::Unavailable`], which the fallback chain logs and skips.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: a poster-sized page rendered at print DPI can
//! exhaust memory. `max_raster_pixels` caps the longest edge regardless of
//! physical size, keeping memory bounded while staying comfortably above the
//! resolution Tesseract needs for body text.

use crate::engines::OcrEngine;
use crate::error::EngineError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Default [`OcrEngine`]: rasterise with pdfium, recognise with `tesseract`.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
    max_raster_pixels: u32,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            max_raster_pixels: 2000,
        }
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tesseract executable (name or full path).
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Recognition language passed as `-l` (default `eng`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Cap on the longest rendered edge in pixels (minimum 100).
    pub fn with_max_raster_pixels(mut self, px: u32) -> Self {
        self.max_raster_pixels = px.max(100);
        self
    }

    /// Check whether the configured tesseract binary can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Rasterise every page into `dir`, returning the PNG paths in page order.
    fn rasterize_pages(&self, path: &Path, dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Failed {
                engine: "ocr",
                detail: format!("failed to open '{}': {:?}", path.display(), e),
            })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_raster_pixels as i32)
            .set_maximum_height(self.max_raster_pixels as i32);

        let pages = document.pages();
        let mut pngs = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = match page.render_with_config(&render_config) {
                Ok(b) => b,
                Err(e) => {
                    warn!("page {}: rasterisation failed, skipping: {:?}", idx + 1, e);
                    continue;
                }
            };
            let image = bitmap.as_image();

            let png_path = dir.join(format!("page_{:04}.png", idx + 1));
            image
                .save_with_format(&png_path, image::ImageFormat::Png)
                .map_err(|e| EngineError::Failed {
                    engine: "ocr",
                    detail: format!("cannot write raster for page {}: {}", idx + 1, e),
                })?;
            pngs.push(png_path);
        }

        Ok(pngs)
    }

    /// Run tesseract over one page image, returning recognised text.
    fn recognize_page(&self, png: &Path) -> Result<String, EngineError> {
        let output = Command::new(&self.command)
            .arg(png)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::Unavailable {
                        engine: "ocr",
                        detail: format!("'{}' not found on PATH", self.command),
                    }
                } else {
                    EngineError::Failed {
                        engine: "ocr",
                        detail: format!("failed to spawn '{}': {}", self.command, e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed {
                engine: "ocr",
                detail: format!(
                    "'{}' exited with {}: {}",
                    self.command,
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, path: &Path) -> Result<String, EngineError> {
        // Probe before rendering anything; a missing binary should cost
        // nothing and surface as Unavailable, not as a render-then-fail.
        if !self.is_available() {
            return Err(EngineError::Unavailable {
                engine: "ocr",
                detail: format!("'{}' not found on PATH", self.command),
            });
        }

        let scratch = tempfile::TempDir::new().map_err(|e| EngineError::Failed {
            engine: "ocr",
            detail: format!("cannot create scratch dir: {}", e),
        })?;

        let pngs = self.rasterize_pages(path, scratch.path())?;
        debug!("rasterised {} pages for OCR", pngs.len());

        let mut text = String::new();
        for png in &pngs {
            let page_text = self.recognize_page(png)?;
            text.push_str(&page_text);
            if !page_text.ends_with('\n') {
                text.push('\n');
            }
        }

        Ok(text)
    }
}
