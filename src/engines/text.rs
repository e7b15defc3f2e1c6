//! Text-layer extraction via pdfium.
//!
//! Born-digital PDFs carry an embedded text layer that pdfium exposes
//! per page. Scanned documents have no such layer — every page comes back
//! as an empty string, which is exactly the signal the orchestrator's
//! fallback chain uses to move on to OCR.

use crate::engines::TextLayerExtractor;
use crate::error::EngineError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Default [`TextLayerExtractor`]: pdfium's per-page text API.
#[derive(Debug, Default)]
pub struct PdfiumTextExtractor;

impl PdfiumTextExtractor {
    pub fn new() -> Self {
        PdfiumTextExtractor
    }
}

impl TextLayerExtractor for PdfiumTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>, EngineError> {
        let pdfium = Pdfium::default();

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Failed {
                engine: "text-layer",
                detail: format!("failed to open '{}': {:?}", path.display(), e),
            })?;

        let doc_pages = document.pages();
        let mut pages = Vec::with_capacity(doc_pages.len() as usize);

        for (idx, page) in doc_pages.iter().enumerate() {
            // A page whose text cannot be read is treated as textless rather
            // than failing the whole document.
            let text = match page.text() {
                Ok(t) => t.all(),
                Err(e) => {
                    warn!("page {}: text layer unreadable: {:?}", idx + 1, e);
                    String::new()
                }
            };
            pages.push(text);
        }

        debug!(
            "text layer: {} pages, {} non-empty",
            pages.len(),
            pages.iter().filter(|p| !p.trim().is_empty()).count()
        );

        Ok(pages)
    }
}
