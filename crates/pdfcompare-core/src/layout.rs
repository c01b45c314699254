//! Pixel-level layout comparison across paginated rasters
//!
//! Pages are paired by position. For each pair both rasters are placed on a
//! canvas as large as the bigger of the two, anchored at the top-left corner,
//! and compared pixel by pixel. A page missing on one side is an empty (0x0)
//! raster, so its counterpart is compared against a transparent canvas.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pixel::{count_mismatched, MatchOptions};
use crate::raster::RasterPage;
use crate::report::format_count;
use crate::round_percentage;

/// Result of comparing two page sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutComparison {
    /// Share of matching pixels as a percentage, 2 decimals
    pub similarity: f64,
    /// Total mismatched pixels across all pages
    pub mismatched_pixel_count: u64,
    /// Page-count and pixel-mismatch samples, in that order
    pub samples: Vec<String>,
}

/// Per-page outcome, kept for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDiff {
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub mismatched: u64,
}

/// Folds page pairs one at a time into running totals
#[derive(Debug, Clone)]
pub struct LayoutAccumulator {
    options: MatchOptions,
    pages_compared: u32,
    total_pixels: u64,
    total_mismatched: u64,
}

impl LayoutAccumulator {
    pub fn new(options: MatchOptions) -> Self {
        Self {
            options,
            pages_compared: 0,
            total_pixels: 0,
            total_mismatched: 0,
        }
    }

    /// Compare the next page pair. Pass `RasterPage::empty()` for a missing side.
    pub fn add_page(&mut self, page_a: &RasterPage, page_b: &RasterPage) -> PageDiff {
        self.pages_compared += 1;
        let page = self.pages_compared;

        let width = page_a.width().max(page_b.width());
        let height = page_a.height().max(page_b.height());
        self.total_pixels += width as u64 * height as u64;

        if width == 0 || height == 0 {
            debug!(page, "Skipping empty page pair");
            return PageDiff {
                page,
                width,
                height,
                mismatched: 0,
            };
        }

        let canvas_a = page_a.on_canvas(width, height);
        let canvas_b = page_b.on_canvas(width, height);
        let mismatched = count_mismatched(&canvas_a, &canvas_b, width, height, self.options);
        self.total_mismatched += mismatched;

        debug!(page, width, height, mismatched, "Compared page pair");
        PageDiff {
            page,
            width,
            height,
            mismatched,
        }
    }

    pub fn total_pixels(&self) -> u64 {
        self.total_pixels
    }

    pub fn total_mismatched(&self) -> u64 {
        self.total_mismatched
    }

    /// Produce the final result given each document's page count
    ///
    /// Missing pages are transparent, which blends to white, so an extra page
    /// lowers similarity only when it has content. The page-count sample is
    /// reported either way.
    pub fn finish(self, page_count_a: u32, page_count_b: u32) -> LayoutComparison {
        let similarity = if self.total_pixels > 0 {
            round_percentage(
                (1.0 - self.total_mismatched as f64 / self.total_pixels as f64) * 100.0,
            )
        } else {
            100.0
        };

        let mut samples = Vec::new();
        if page_count_a != page_count_b {
            samples.push(format!(
                "Different page count ({} in document A vs {} in document B).",
                page_count_a, page_count_b
            ));
        }
        if self.total_mismatched > 0 {
            samples.push(format!(
                "Found visual differences in {} pixels across pages.",
                format_count(self.total_mismatched)
            ));
        }

        LayoutComparison {
            similarity,
            mismatched_pixel_count: self.total_mismatched,
            samples,
        }
    }
}

/// Compare two in-memory page sequences
pub fn compare_layout(
    pages_a: &[RasterPage],
    pages_b: &[RasterPage],
    options: MatchOptions,
) -> LayoutComparison {
    let empty = RasterPage::empty();
    let mut acc = LayoutAccumulator::new(options);
    for i in 0..pages_a.len().max(pages_b.len()) {
        let page_a = pages_a.get(i).unwrap_or(&empty);
        let page_b = pages_b.get(i).unwrap_or(&empty);
        acc.add_page(page_a, page_b);
    }
    acc.finish(pages_a.len() as u32, pages_b.len() as u32)
}
