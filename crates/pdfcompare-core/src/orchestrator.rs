//! Comparison orchestration
//!
//! Drives both documents through text extraction and page rasterization and
//! merges the two comparator results into one report.
//!
//! ```text
//!  doc A ─┬─ extract text ──────────────┐
//!  doc B ─┴─ extract text ──────────────┴─▶ TextComparator ──────┐
//!                                                                 ├─▶ ComparisonReport
//!  doc A ─┬─ page 1, page 2, ... ───────┐                         │
//!  doc B ─┴─ page 1, page 2, ... ───────┴─▶ LayoutAccumulator ───┘
//! ```
//!
//! Work for document A and document B runs concurrently. Pages are fetched
//! strictly in order, one page per document at a time, and each pair is
//! dropped as soon as it has been folded into the layout totals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{CompareOptions, RasterFailurePolicy};
use crate::document::DocumentSource;
use crate::error::CompareError;
use crate::layout::{LayoutAccumulator, LayoutComparison};
use crate::raster::RasterPage;
use crate::report::ComparisonReport;
use crate::text::{TextComparator, TextComparison};

/// Shared flag to stop a running comparison between pages
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs text and layout comparison for a pair of documents
#[derive(Debug, Clone)]
pub struct ComparisonOrchestrator {
    options: CompareOptions,
    cancellation: CancellationFlag,
}

impl ComparisonOrchestrator {
    pub fn new(options: CompareOptions) -> Result<Self, CompareError> {
        options.validate()?;
        Ok(Self {
            options,
            cancellation: CancellationFlag::new(),
        })
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two documents. Any fatal failure aborts the run without a partial report.
    #[instrument(skip_all, fields(doc_a = doc_a.name(), doc_b = doc_b.name()))]
    pub async fn run(
        &self,
        doc_a: &dyn DocumentSource,
        doc_b: &dyn DocumentSource,
    ) -> Result<ComparisonReport, CompareError> {
        let start = Instant::now();
        info!("Starting comparison");

        let (text, (layout, page_count_a, page_count_b)) = tokio::try_join!(
            self.compare_text(doc_a, doc_b),
            self.compare_layout(doc_a, doc_b)
        )?;

        let report = ComparisonReport::merge(text, layout, page_count_a, page_count_b);
        info!(
            text_similarity = report.text_similarity,
            layout_similarity = report.layout_similarity,
            duration_ms = start.elapsed().as_millis() as u64,
            "Comparison finished"
        );
        Ok(report)
    }

    async fn compare_text(
        &self,
        doc_a: &dyn DocumentSource,
        doc_b: &dyn DocumentSource,
    ) -> Result<TextComparison, CompareError> {
        let (text_a, text_b) = tokio::try_join!(doc_a.extract_text(), doc_b.extract_text())?;
        debug!(
            chars_a = text_a.len(),
            chars_b = text_b.len(),
            "Extracted text"
        );
        Ok(TextComparator::new(self.options.max_text_samples).compare(&text_a, &text_b))
    }

    async fn compare_layout(
        &self,
        doc_a: &dyn DocumentSource,
        doc_b: &dyn DocumentSource,
    ) -> Result<(LayoutComparison, u32, u32), CompareError> {
        let (count_a, count_b) = tokio::try_join!(doc_a.page_count(), doc_b.page_count())?;
        debug!(count_a, count_b, "Comparing layout");

        let mut acc = LayoutAccumulator::new(self.options.match_options());
        for page in 1..=count_a.max(count_b) {
            if self.cancellation.is_cancelled() {
                info!(page, "Comparison cancelled");
                return Err(CompareError::Cancelled);
            }

            let (raster_a, raster_b) = tokio::try_join!(
                self.rasterize(doc_a, page, count_a),
                self.rasterize(doc_b, page, count_b)
            )?;
            acc.add_page(&raster_a, &raster_b);
        }

        Ok((acc.finish(count_a, count_b), count_a, count_b))
    }

    /// Fetch one page, substituting an empty raster past the end of the document
    async fn rasterize(
        &self,
        doc: &dyn DocumentSource,
        page: u32,
        page_count: u32,
    ) -> Result<RasterPage, CompareError> {
        if page > page_count {
            return Ok(RasterPage::empty());
        }

        match doc.rasterize_page(page, self.options.render_scale).await {
            Ok(raster) => Ok(raster),
            Err(e)
                if e.is_page_failure()
                    && self.options.raster_failure_policy == RasterFailurePolicy::Degrade =>
            {
                warn!(document = doc.name(), page, error = %e, "Comparing page as empty");
                Ok(RasterPage::empty())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_new_validates_options() {
        let options = CompareOptions {
            pixel_threshold: -0.5,
            ..CompareOptions::default()
        };
        assert!(matches!(
            ComparisonOrchestrator::new(options),
            Err(CompareError::InvalidOptions(_))
        ));
    }
}
