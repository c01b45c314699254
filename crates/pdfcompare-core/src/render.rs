//! Page rasterizers
//!
//! A [`PageRasterizer`] turns one page of a document into an RGBA raster.
//! [`PngPageRasterizer`] reads pages that were rendered ahead of time into a
//! directory of PNG files, one file per page. With the `pdfium` feature,
//! `PdfiumRasterizer` renders pages straight from the PDF.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::raster::RasterPage;

/// Default file name pattern for pre-rendered pages
pub const DEFAULT_PAGE_PATTERN: &str = "page-{page}.png";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No rendered page at {0}")]
    MissingPage(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode PNG: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("Unsupported PNG color type {0:?}")]
    UnsupportedColor(png::ColorType),

    #[error("Decoded buffer does not match page size: {0}")]
    InvalidBuffer(String),

    #[error("{0}")]
    Backend(String),
}

/// Produces the raster for one page (1-indexed) at a given scale
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, page: u32, scale: f32) -> Result<RasterPage, RenderError>;
}

/// Loads pre-rendered pages from `<dir>/<pattern>`, with `{page}` replaced by the page number
#[derive(Debug, Clone)]
pub struct PngPageRasterizer {
    dir: PathBuf,
    pattern: String,
}

impl PngPageRasterizer {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_pattern(dir, DEFAULT_PAGE_PATTERN)
    }

    pub fn with_pattern<P: AsRef<Path>>(dir: P, pattern: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            pattern: pattern.to_string(),
        }
    }

    pub fn page_path(&self, page: u32) -> PathBuf {
        self.dir.join(self.pattern.replace("{page}", &page.to_string()))
    }
}

impl PageRasterizer for PngPageRasterizer {
    fn rasterize(&self, page: u32, scale: f32) -> Result<RasterPage, RenderError> {
        // pre-rendered pages already carry the scale they were rendered at
        let path = self.page_path(page);
        debug!(page, scale, path = %path.display(), "Loading rendered page");
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RenderError::MissingPage(path.clone()),
            _ => RenderError::Io {
                path: path.clone(),
                source: e,
            },
        })?;
        decode_png(BufReader::new(file))
    }
}

/// Decode a PNG stream into an RGBA8 raster
pub fn decode_png<R: io::Read>(input: R) -> Result<RasterPage, RenderError> {
    let mut decoder = png::Decoder::new(input);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        other => return Err(RenderError::UnsupportedColor(other)),
    };

    RasterPage::new(info.width, info.height, rgba)
        .map_err(|e| RenderError::InvalidBuffer(e.to_string()))
}
