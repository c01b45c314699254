//! Document comparison engine
//!
//! Scores two documents on two independent axes:
//!
//! - **Text**: Jaccard similarity of their distinct words
//! - **Layout**: share of matching pixels between their rendered pages
//!
//! Documents are supplied through the [`DocumentSource`] trait, so parsing and
//! rendering stay outside the engine. [`PdfDocument`] covers PDF files whose
//! pages were rendered to PNG ahead of time, or are rendered with PDFium when
//! the `pdfium` feature is enabled. [`MemoryDocument`] covers content already
//! held in memory.
//!
//! # Example
//!
//! ```
//! use pdfcompare_core::{compare_documents, CompareOptions, MemoryDocument, RasterPage};
//!
//! # async fn example() -> Result<(), pdfcompare_core::CompareError> {
//! let white = RasterPage::filled(100, 100, [255, 255, 255, 255]);
//! let doc_a = MemoryDocument::new("a", "alpha beta gamma").with_page(white.clone());
//! let doc_b = MemoryDocument::new("b", "alpha beta delta").with_page(white);
//!
//! let report = compare_documents(&doc_a, &doc_b, CompareOptions::default()).await?;
//! assert_eq!(report.text_similarity, 50.0);
//! assert_eq!(report.layout_similarity, 100.0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod orchestrator;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod pixel;
pub mod raster;
pub mod render;
pub mod report;
pub mod text;

pub use config::{CompareOptions, RasterFailurePolicy};
pub use document::{DocumentSource, MemoryDocument, PdfDocument};
pub use error::CompareError;
pub use layout::{compare_layout, LayoutAccumulator, LayoutComparison};
pub use orchestrator::{CancellationFlag, ComparisonOrchestrator};
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use pixel::MatchOptions;
pub use raster::RasterPage;
pub use render::{PageRasterizer, PngPageRasterizer};
pub use report::{ComparisonReport, ReportFormat, Reporter};
pub use text::{compare_text, TextComparator, TextComparison};

/// Compare two documents with the given options
pub async fn compare_documents(
    doc_a: &dyn DocumentSource,
    doc_b: &dyn DocumentSource,
    options: CompareOptions,
) -> Result<ComparisonReport, CompareError> {
    ComparisonOrchestrator::new(options)?.run(doc_a, doc_b).await
}

/// Round a percentage to 2 decimals, halves away from zero
pub(crate) fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
