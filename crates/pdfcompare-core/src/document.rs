//! Document collaborators
//!
//! The comparison engine never parses or renders documents itself. It asks a
//! [`DocumentSource`] for three things: the full text, the page count, and a
//! raster of one page at a time.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::CompareError;
use crate::raster::RasterPage;
use crate::render::PageRasterizer;

/// A document that can be compared
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Label used in logs and error messages
    fn name(&self) -> &str;

    /// Full text of the document, pages joined by a separator
    async fn extract_text(&self) -> Result<String, CompareError>;

    async fn page_count(&self) -> Result<u32, CompareError>;

    /// Rasterize one page (1-indexed) at the given scale
    async fn rasterize_page(&self, page: u32, scale: f32) -> Result<RasterPage, CompareError>;
}

/// In-memory document with pre-rendered pages
///
/// Pages or text can be marked as failing to exercise error handling.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    name: String,
    text: Result<String, String>,
    pages: Vec<Result<RasterPage, String>>,
}

impl MemoryDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
            pages: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: RasterPage) -> Self {
        self.pages.push(Ok(page));
        self
    }

    pub fn with_pages(mut self, pages: impl IntoIterator<Item = RasterPage>) -> Self {
        self.pages.extend(pages.into_iter().map(Ok));
        self
    }

    /// Append a page whose rasterization fails with `reason`
    pub fn with_failed_page(mut self, reason: impl Into<String>) -> Self {
        self.pages.push(Err(reason.into()));
        self
    }

    /// Make text extraction fail with `reason`
    pub fn with_failed_text(mut self, reason: impl Into<String>) -> Self {
        self.text = Err(reason.into());
        self
    }
}

#[async_trait]
impl DocumentSource for MemoryDocument {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_text(&self) -> Result<String, CompareError> {
        self.text
            .clone()
            .map_err(|reason| CompareError::extraction(&self.name, reason))
    }

    async fn page_count(&self) -> Result<u32, CompareError> {
        Ok(self.pages.len() as u32)
    }

    async fn rasterize_page(&self, page: u32, _scale: f32) -> Result<RasterPage, CompareError> {
        let index = page.checked_sub(1).map(|i| i as usize);
        match index.and_then(|i| self.pages.get(i)) {
            Some(Ok(raster)) => Ok(raster.clone()),
            Some(Err(reason)) => Err(CompareError::rasterization(&self.name, page, reason)),
            None => Err(CompareError::rasterization(
                &self.name,
                page,
                format!("page out of range (document has {} pages)", self.pages.len()),
            )),
        }
    }
}

/// A PDF file: text via `pdf-extract`, page count via `lopdf`, pages via a rasterizer
pub struct PdfDocument {
    name: String,
    bytes: Arc<Vec<u8>>,
    page_count: u32,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl PdfDocument {
    /// Parse PDF bytes and pair them with a page rasterizer.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionFailure` if the bytes are not a loadable PDF or the
    /// document is encrypted.
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: Vec<u8>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self, CompareError> {
        Self::from_shared(name.into(), Arc::new(bytes), rasterizer)
    }

    /// Read and parse a PDF file, named after its path
    pub fn open<P: AsRef<Path>>(
        path: P,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self, CompareError> {
        let (name, bytes) = read_pdf(path.as_ref())?;
        Self::from_shared(name, Arc::new(bytes), rasterizer)
    }

    /// Read a PDF file and render its pages with PDFium
    #[cfg(feature = "pdfium")]
    pub fn open_with_pdfium<P: AsRef<Path>>(path: P) -> Result<Self, CompareError> {
        let (name, bytes) = read_pdf(path.as_ref())?;
        let bytes = Arc::new(bytes);
        let rasterizer = Arc::new(crate::pdfium::PdfiumRasterizer::new(Arc::clone(&bytes)));
        Self::from_shared(name, bytes, rasterizer)
    }

    fn from_shared(
        name: String,
        bytes: Arc<Vec<u8>>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self, CompareError> {
        let doc = lopdf::Document::load_mem(&bytes)
            .map_err(|e| CompareError::extraction(&name, format!("Failed to parse PDF: {}", e)))?;
        if doc.is_encrypted() {
            return Err(CompareError::extraction(&name, "document is encrypted"));
        }
        let page_count = doc.get_pages().len() as u32;
        debug!(document = %name, page_count, "Loaded PDF");

        Ok(Self {
            name,
            bytes,
            page_count,
            rasterizer,
        })
    }
}

fn read_pdf(path: &Path) -> Result<(String, Vec<u8>), CompareError> {
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| CompareError::extraction(&name, e))?;
    Ok((name, bytes))
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .field("page_count", &self.page_count)
            .finish()
    }
}

#[async_trait]
impl DocumentSource for PdfDocument {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_text(&self) -> Result<String, CompareError> {
        let bytes = Arc::clone(&self.bytes);
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| CompareError::extraction(&self.name, e))?
        .map_err(|e| CompareError::extraction(&self.name, e))
    }

    async fn page_count(&self) -> Result<u32, CompareError> {
        Ok(self.page_count)
    }

    async fn rasterize_page(&self, page: u32, scale: f32) -> Result<RasterPage, CompareError> {
        if page == 0 || page > self.page_count {
            return Err(CompareError::rasterization(
                &self.name,
                page,
                format!("page out of range (document has {} pages)", self.page_count),
            ));
        }
        let rasterizer = Arc::clone(&self.rasterizer);
        tokio::task::spawn_blocking(move || {
            rasterizer.rasterize(page, scale).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| CompareError::rasterization(&self.name, page, e))?
        .map_err(|e| CompareError::rasterization(&self.name, page, e))
    }
}
