//! Embedded-image export via pdfium page objects.
//!
//! Walks every page's object list, pulls out raster image objects, and saves
//! each one as a PNG named `<base>_page<p>_img<i>.png` (both indices
//! 1-based). An image that cannot be decoded is skipped with a warning — the
//! interface fails soft on unreadable embedded images and only errors when
//! the document itself cannot be opened.

use crate::engines::ImageExtractor;
use crate::error::EngineError;
use crate::model::ImageArtifact;
use crate::writer::image_artifact_path;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Default [`ImageExtractor`]: pdfium page-object export.
#[derive(Debug, Default)]
pub struct PdfiumImageExtractor;

impl PdfiumImageExtractor {
    pub fn new() -> Self {
        PdfiumImageExtractor
    }
}

impl ImageExtractor for PdfiumImageExtractor {
    fn extract_images(
        &self,
        path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ImageArtifact>, EngineError> {
        std::fs::create_dir_all(output_dir).map_err(|e| EngineError::Failed {
            engine: "image",
            detail: format!("cannot create '{}': {}", output_dir.display(), e),
        })?;

        let base_name = crate::writer::document_base_name(path);

        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Failed {
                engine: "image",
                detail: format!("failed to open '{}': {:?}", path.display(), e),
            })?;

        let pages = document.pages();
        let mut artifacts = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let page_num = page_idx + 1;
            let mut img_index = 0;

            for object in page.objects().iter() {
                let PdfPageObject::Image(ref image_obj) = object else {
                    continue;
                };
                img_index += 1;

                let image = match image_obj.get_raw_image() {
                    Ok(img) => img,
                    Err(e) => {
                        warn!(
                            "page {page_num} image {img_index}: unreadable, skipping: {:?}",
                            e
                        );
                        continue;
                    }
                };

                let img_path = image_artifact_path(output_dir, &base_name, page_num, img_index);
                if let Err(e) = image.save_with_format(&img_path, image::ImageFormat::Png) {
                    warn!(
                        "page {page_num} image {img_index}: save failed, skipping: {}",
                        e
                    );
                    continue;
                }

                artifacts.push(ImageArtifact {
                    path: img_path,
                    page: page_num,
                    index: img_index,
                });
            }
        }

        debug!("exported {} embedded images", artifacts.len());
        Ok(artifacts)
    }
}
