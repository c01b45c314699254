//! Comparison report and its output formats
//!
//! # Example
//!
//! ```
//! use pdfcompare_core::report::{ComparisonReport, ReportFormat, Reporter};
//! use pdfcompare_core::{compare_layout, compare_text, MatchOptions};
//!
//! let text = compare_text("alpha beta", "alpha gamma");
//! let layout = compare_layout(&[], &[], MatchOptions::default());
//! let report = ComparisonReport::merge(text, layout, 0, 0);
//!
//! let json = Reporter::new(ReportFormat::Json).format(&report).unwrap();
//! assert!(json.contains("\"textSimilarity\":33.33"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::error::CompareError;
use crate::layout::LayoutComparison;
use crate::text::TextComparison;

/// Final output of a document comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub text_similarity: f64,
    pub text_divergence_count: usize,
    pub text_divergence_samples: Vec<String>,
    pub layout_similarity: f64,
    /// Mismatched pixels across all pages
    pub layout_divergence_count: u64,
    pub layout_divergence_samples: Vec<String>,
    pub page_count_a: u32,
    pub page_count_b: u32,
}

impl ComparisonReport {
    /// Combine the two comparator results without altering either
    pub fn merge(
        text: TextComparison,
        layout: LayoutComparison,
        page_count_a: u32,
        page_count_b: u32,
    ) -> Self {
        Self {
            text_similarity: text.similarity,
            text_divergence_count: text.divergence_count,
            text_divergence_samples: text.samples,
            layout_similarity: layout.similarity,
            layout_divergence_count: layout.mismatched_pixel_count,
            layout_divergence_samples: layout.samples,
            page_count_a,
            page_count_b,
        }
    }
}

/// Format an integer with `,` between groups of three digits
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Console,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// Renders reports in one format
#[derive(Debug, Default)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render a report as a string
    ///
    /// # Arguments
    ///
    /// * `report` - Comparison result to render
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if JSON encoding fails. Console output
    /// never fails.
    pub fn format(&self, report: &ComparisonReport) -> Result<String, CompareError> {
        match self.format {
            ReportFormat::Json => serde_json::to_string(report)
                .map_err(|e| CompareError::SerializationError(e.to_string())),
            ReportFormat::JsonPretty => serde_json::to_string_pretty(report)
                .map_err(|e| CompareError::SerializationError(e.to_string())),
            ReportFormat::Console => Ok(format_console(report)),
        }
    }

    /// Write the formatted report to a file, replacing any existing content
    ///
    /// # Arguments
    ///
    /// * `report` - Comparison result to render
    /// * `path` - Destination file
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if formatting fails and `Io` if the file
    /// cannot be written.
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        report: &ComparisonReport,
        path: P,
    ) -> Result<(), CompareError> {
        let output = self.format(report)?;
        fs::write(path, output)?;
        Ok(())
    }
}

fn format_console(report: &ComparisonReport) -> String {
    let mut output = String::new();
    // writing into a String cannot fail
    let _ = write_console(&mut output, report);
    output
}

fn write_console(output: &mut String, report: &ComparisonReport) -> std::fmt::Result {
    writeln!(output)?;
    writeln!(output, "════════════════════════════════════════════════════════════════")?;
    writeln!(output, "                      COMPARISON RESULTS")?;
    writeln!(output, "════════════════════════════════════════════════════════════════")?;
    writeln!(output)?;
    writeln!(output, "Pages:     {} vs {}", report.page_count_a, report.page_count_b)?;
    writeln!(output)?;

    writeln!(output, "Text")?;
    writeln!(output, "  Similarity:   {:.2}%", report.text_similarity)?;
    writeln!(output, "  Divergences:  {}", format_count(report.text_divergence_count as u64))?;
    for sample in &report.text_divergence_samples {
        writeln!(output, "  • {}", sample)?;
    }
    writeln!(output)?;

    writeln!(output, "Layout")?;
    writeln!(output, "  Similarity:   {:.2}%", report.layout_similarity)?;
    writeln!(output, "  Divergences:  {} pixels", format_count(report.layout_divergence_count))?;
    for sample in &report.layout_divergence_samples {
        writeln!(output, "  • {}", sample)?;
    }
    writeln!(output)?;
    Ok(())
}
