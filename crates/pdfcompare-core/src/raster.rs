//! Owned RGBA page rasters

use std::borrow::Cow;

use crate::error::CompareError;

/// Bytes per RGBA8 pixel
pub const CHANNELS: usize = 4;

/// A rendered page: row-major RGBA8 samples
#[derive(Clone, PartialEq, Eq)]
pub struct RasterPage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterPage {
    /// Wrap an RGBA buffer, checking its length against the dimensions
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CompareError> {
        let expected = buffer_len(width, height);
        if data.len() != expected {
            return Err(CompareError::InvalidRaster {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// The 0x0 page that stands in for a page missing on one side
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// A page filled with a single color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(buffer_len(width, height))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let pos = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[pos..pos + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Paint a solid rectangle, clipped to the page
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                let pos = (row as usize * self.width as usize + col as usize) * CHANNELS;
                self.data[pos..pos + CHANNELS].copy_from_slice(&rgba);
            }
        }
    }

    /// View this page on a `width x height` canvas anchored at the origin.
    ///
    /// The region outside the page is transparent black. Borrows when the
    /// canvas matches the page size.
    pub fn on_canvas(&self, width: u32, height: u32) -> Cow<'_, [u8]> {
        if width == self.width && height == self.height {
            return Cow::Borrowed(&self.data);
        }

        let mut canvas = vec![0u8; buffer_len(width, height)];
        let copy_w = self.width.min(width) as usize * CHANNELS;
        let rows = self.height.min(height) as usize;
        let src_stride = self.width as usize * CHANNELS;
        let dst_stride = width as usize * CHANNELS;
        for row in 0..rows {
            let src = row * src_stride;
            let dst = row * dst_stride;
            canvas[dst..dst + copy_w].copy_from_slice(&self.data[src..src + copy_w]);
        }
        Cow::Owned(canvas)
    }
}

impl Default for RasterPage {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RasterPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterPage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
