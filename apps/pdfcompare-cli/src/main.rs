//! pdfcompare binary
//!
//! Compares two PDFs and prints the text and layout similarity report. Pages
//! come from directories of pre-rendered PNG files, or are rendered with
//! PDFium when the binary is built with the `pdfium` feature.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pdfcompare_core::render::DEFAULT_PAGE_PATTERN;
use pdfcompare_core::{
    CancellationFlag, CompareOptions, ComparisonOrchestrator, PdfDocument, PngPageRasterizer,
    RasterFailurePolicy, ReportFormat, Reporter,
};

#[derive(Parser, Debug)]
#[command(name = "pdfcompare")]
#[command(version, about = "Compare the text and visual layout of two PDF documents")]
struct Args {
    /// First (original) PDF
    doc_a: PathBuf,

    /// Second PDF to compare against the first
    doc_b: PathBuf,

    /// Directory with the rendered pages of the first PDF, rendered with PDFium when omitted
    #[arg(long)]
    pages_a: Option<PathBuf>,

    /// Directory with the rendered pages of the second PDF, rendered with PDFium when omitted
    #[arg(long)]
    pages_b: Option<PathBuf>,

    /// File name pattern of rendered pages, `{page}` is the 1-based page number
    #[arg(long, default_value = DEFAULT_PAGE_PATTERN)]
    page_pattern: String,

    /// TOML file with comparison options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-pixel color tolerance in [0, 1]
    #[arg(long)]
    threshold: Option<f64>,

    /// Example words listed per text divergence category
    #[arg(long)]
    max_samples: Option<usize>,

    /// Compare pages that fail to load as blank instead of aborting
    #[arg(long)]
    degrade: bool,

    /// Count anti-aliased pixels as differences
    #[arg(long)]
    include_aa: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Console)]
    format: Format,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Console,
    Json,
    JsonPretty,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => ReportFormat::Console,
            Format::Json => ReportFormat::Json,
            Format::JsonPretty => ReportFormat::JsonPretty,
        }
    }
}

impl Args {
    /// Options from the config file (or defaults) with command-line overrides applied
    fn compare_options(&self) -> Result<CompareOptions> {
        let mut options = match &self.config {
            Some(path) => CompareOptions::from_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => CompareOptions::default(),
        };

        if let Some(threshold) = self.threshold {
            options.pixel_threshold = threshold;
        }
        if let Some(max_samples) = self.max_samples {
            options.max_text_samples = max_samples;
        }
        if self.degrade {
            options.raster_failure_policy = RasterFailurePolicy::Degrade;
        }
        if self.include_aa {
            options.include_anti_aliasing = true;
        }

        options.validate()?;
        Ok(options)
    }
}

/// Open a PDF, reading its pages from `pages` when given
fn open_document(path: &Path, pages: Option<&Path>, pattern: &str) -> Result<PdfDocument> {
    match pages {
        Some(dir) => Ok(PdfDocument::open(
            path,
            Arc::new(PngPageRasterizer::with_pattern(dir, pattern)),
        )?),
        None => open_rendered(path),
    }
}

#[cfg(feature = "pdfium")]
fn open_rendered(path: &Path) -> Result<PdfDocument> {
    Ok(PdfDocument::open_with_pdfium(path)?)
}

#[cfg(not(feature = "pdfium"))]
fn open_rendered(path: &Path) -> Result<PdfDocument> {
    anyhow::bail!(
        "No rendered pages for {}: pass --pages-a/--pages-b or build with the `pdfium` feature",
        path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the report, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("pdfcompare_core=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = args.compare_options()?;

    let doc_a = open_document(&args.doc_a, args.pages_a.as_deref(), &args.page_pattern)?;
    let doc_b = open_document(&args.doc_b, args.pages_b.as_deref(), &args.page_pattern)?;

    let cancellation = CancellationFlag::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current page");
            on_interrupt.cancel();
        }
    });

    let report = ComparisonOrchestrator::new(options)?
        .with_cancellation(cancellation)
        .run(&doc_a, &doc_b)
        .await
        .context("Comparison failed")?;

    let reporter = Reporter::new(args.format.into());
    match &args.output {
        Some(path) => {
            reporter
                .write_to_file(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print!("{}", reporter.format(&report)?),
    }

    Ok(())
}
