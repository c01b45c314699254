//! PDF page rendering with PDFium
//!
//! Binds to a PDFium shared library next to the executable or, failing that,
//! the system one. Pages are rendered at `scale` pixels per PDF point, so a
//! US Letter page (612x792pt) at the default scale of 1.5 becomes 918x1188.

use pdfium_render::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::raster::RasterPage;
use crate::render::{PageRasterizer, RenderError};

// PDFium keeps global library state, one render at a time per process
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// Renders pages of an in-memory PDF
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    bytes: Arc<Vec<u8>>,
}

impl PdfiumRasterizer {
    pub fn new(bytes: Arc<Vec<u8>>) -> Self {
        Self { bytes }
    }
}

/// Pixel size of a page of `width x height` points rendered at `scale`
pub fn target_size(width: f32, height: f32, scale: f32) -> (i32, i32) {
    ((width * scale) as i32, (height * scale) as i32)
}

fn bind() -> Result<Pdfium, RenderError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| RenderError::Backend(format!("Failed to bind PDFium: {}", e)))?;
    Ok(Pdfium::new(bindings))
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, page: u32, scale: f32) -> Result<RasterPage, RenderError> {
        let index = page
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| RenderError::Backend(format!("Page {} is out of range", page)))?;

        let _guard = PDFIUM_LOCK
            .lock()
            .map_err(|_| RenderError::Backend("PDFium lock poisoned".to_string()))?;
        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| RenderError::Backend(format!("Failed to load PDF: {}", e)))?;
        let pdf_page = document
            .pages()
            .get(index)
            .map_err(|e| RenderError::Backend(format!("Failed to open page {}: {}", page, e)))?;

        let (width, height) = target_size(pdf_page.width().value, pdf_page.height().value, scale);
        debug!(page, scale, width, height, "Rendering page");

        let bitmap = pdf_page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| RenderError::Backend(format!("Failed to render page {}: {}", page, e)))?;

        let image = bitmap.as_image().to_rgba8();
        let (width, height) = image.dimensions();
        RasterPage::new(width, height, image.into_raw())
            .map_err(|e| RenderError::InvalidBuffer(e.to_string()))
    }
}
