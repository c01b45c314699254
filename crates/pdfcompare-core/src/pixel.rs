//! Perceptual pixel matching
//!
//! Colors are compared in YIQ space after blending alpha against white.
//! A pixel pair counts as mismatched when its weighted distance exceeds
//! `35215 * threshold^2` (35215 is the maximum possible YIQ delta). Pixels
//! that look like anti-aliasing in either image are ignored unless
//! `include_anti_aliasing` is set.

use crate::raster::CHANNELS;

/// Default per-pixel tolerance
pub const DEFAULT_THRESHOLD: f64 = 0.1;

const MAX_YIQ_DELTA: f64 = 35215.0;

/// Options for a single buffer comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Color distance tolerance in [0, 1]
    pub threshold: f64,
    /// Count anti-aliased pixels as mismatches
    pub include_anti_aliasing: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            include_anti_aliasing: false,
        }
    }
}

/// Count mismatched pixels between two `width x height` RGBA buffers.
///
/// Both slices must hold exactly `width * height * 4` bytes.
pub fn count_mismatched(
    img1: &[u8],
    img2: &[u8],
    width: u32,
    height: u32,
    options: MatchOptions,
) -> u64 {
    let len = width as usize * height as usize * CHANNELS;
    debug_assert_eq!(img1.len(), len);
    debug_assert_eq!(img2.len(), len);

    if img1 == img2 {
        return 0;
    }

    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let image1 = Image::new(img1, width, height);
    let image2 = Image::new(img2, width, height);
    let mut diff = 0;

    for y in 0..height as usize {
        for x in 0..width as usize {
            let pos = image1.offset(x, y);
            let delta = color_delta(img1, img2, pos, pos, false);
            if delta.abs() <= max_delta {
                continue;
            }
            if !options.include_anti_aliasing
                && (antialiased(&image1, x, y, &image2) || antialiased(&image2, x, y, &image1))
            {
                continue;
            }
            diff += 1;
        }
    }

    diff
}

struct Image<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> Image<'a> {
    fn new(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width: width as usize,
            height: height as usize,
        }
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * CHANNELS
    }

    /// 3x3 neighborhood bounds clipped to the image, plus whether the pixel sits on the edge
    fn neighborhood(&self, x: usize, y: usize) -> (usize, usize, usize, usize, bool) {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x2 = (x + 1).min(self.width - 1);
        let y2 = (y + 1).min(self.height - 1);
        let on_edge = x == x0 || x == x2 || y == y0 || y == y2;
        (x0, y0, x2, y2, on_edge)
    }
}

/// Whether the pixel at (x, y) of `img` is likely an anti-aliasing artifact
fn antialiased(img: &Image<'_>, x: usize, y: usize, other: &Image<'_>) -> bool {
    let (x0, y0, x2, y2, on_edge) = img.neighborhood(x, y);
    let pos = img.offset(x, y);
    let mut zeroes = usize::from(on_edge);
    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_at = (0, 0);
    let mut max_at = (0, 0);

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            let delta = color_delta(img.data, img.data, pos, img.offset(nx, ny), true);
            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_at = (nx, ny);
            } else if delta > max {
                max = delta;
                max_at = (nx, ny);
            }
        }
    }

    // no darker or no brighter neighbor: not an edge gradient
    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_at.0, min_at.1) && has_many_siblings(other, min_at.0, min_at.1))
        || (has_many_siblings(img, max_at.0, max_at.1)
            && has_many_siblings(other, max_at.0, max_at.1))
}

/// Whether the pixel has more than two identical neighbors
fn has_many_siblings(img: &Image<'_>, x: usize, y: usize) -> bool {
    let (x0, y0, x2, y2, on_edge) = img.neighborhood(x, y);
    let pos = img.offset(x, y);
    let pixel = &img.data[pos..pos + CHANNELS];
    let mut zeroes = usize::from(on_edge);

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            let other = img.offset(nx, ny);
            if pixel == &img.data[other..other + CHANNELS] {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}

/// Signed YIQ distance between pixel `k` of `img1` and pixel `m` of `img2`.
///
/// Negative when the first pixel is brighter. With `y_only` the luma
/// difference alone is returned.
fn color_delta(img1: &[u8], img2: &[u8], k: usize, m: usize, y_only: bool) -> f64 {
    let (r1, g1, b1, a1) = (img1[k], img1[k + 1], img1[k + 2], img1[k + 3]);
    let (r2, g2, b2, a2) = (img2[m], img2[m + 1], img2[m + 2], img2[m + 3]);

    if a1 == a2 && r1 == r2 && g1 == g2 && b1 == b2 {
        return 0.0;
    }

    let [r1, g1, b1] = blend_on_white(r1, g1, b1, a1);
    let [r2, g2, b2] = blend_on_white(r2, g2, b2, a2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn blend_on_white(r: u8, g: u8, b: u8, a: u8) -> [f64; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    if a == 255 {
        return [r, g, b];
    }
    let a = a as f64 / 255.0;
    let blend = |c: f64| 255.0 + (c - 255.0) * a;
    [blend(r), blend(g), blend(b)]
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterPage;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn mismatched(a: &RasterPage, b: &RasterPage, options: MatchOptions) -> u64 {
        count_mismatched(a.as_bytes(), b.as_bytes(), a.width(), a.height(), options)
    }

    #[test]
    fn test_identical_buffers() {
        let page = RasterPage::filled(20, 20, WHITE);
        assert_eq!(mismatched(&page, &page.clone(), MatchOptions::default()), 0);
    }

    #[test]
    fn test_black_square_on_white() {
        let white = RasterPage::filled(100, 100, WHITE);
        let mut marked = white.clone();
        marked.fill_rect(40, 40, 10, 10, BLACK);
        assert_eq!(mismatched(&white, &marked, MatchOptions::default()), 100);
    }

    #[test]
    fn test_square_touching_corner() {
        let white = RasterPage::filled(30, 30, WHITE);
        let mut marked = white.clone();
        marked.fill_rect(0, 0, 5, 5, BLACK);
        assert_eq!(mismatched(&white, &marked, MatchOptions::default()), 25);
    }

    #[test]
    fn test_small_color_shift_is_tolerated() {
        let a = RasterPage::filled(10, 10, [200, 200, 200, 255]);
        let b = RasterPage::filled(10, 10, [203, 203, 203, 255]);
        assert_eq!(mismatched(&a, &b, MatchOptions::default()), 0);
    }

    #[test]
    fn test_zero_threshold_counts_any_difference() {
        let a = RasterPage::filled(10, 10, [200, 200, 200, 255]);
        let b = RasterPage::filled(10, 10, [201, 200, 200, 255]);
        let options = MatchOptions {
            threshold: 0.0,
            include_anti_aliasing: true,
        };
        assert_eq!(mismatched(&a, &b, options), 100);
    }

    #[test]
    fn test_transparent_matches_white() {
        let transparent = RasterPage::filled(5, 5, [0, 0, 0, 0]);
        let white = RasterPage::filled(5, 5, WHITE);
        assert_eq!(mismatched(&transparent, &white, MatchOptions::default()), 0);
    }

    #[test]
    fn test_transparent_differs_from_black() {
        let transparent = RasterPage::filled(5, 5, [0, 0, 0, 0]);
        let black = RasterPage::filled(5, 5, BLACK);
        assert_eq!(mismatched(&transparent, &black, MatchOptions::default()), 25);
    }

    #[test]
    fn test_anti_aliased_edge_is_ignored() {
        // A black bar whose lower edge is a lighter gray in one image
        let mut a = RasterPage::filled(12, 12, WHITE);
        a.fill_rect(0, 4, 12, 3, BLACK);
        let mut b = a.clone();
        b.fill_rect(3, 7, 1, 1, [128, 128, 128, 255]);

        assert_eq!(mismatched(&a, &b, MatchOptions::default()), 0);

        let strict = MatchOptions {
            include_anti_aliasing: true,
            ..MatchOptions::default()
        };
        assert_eq!(mismatched(&a, &b, strict), 1);
    }

    #[test]
    fn test_color_delta_sign() {
        let white = WHITE;
        let black = BLACK;
        assert!(color_delta(&white, &black, 0, 0, false) < 0.0);
        assert!(color_delta(&black, &white, 0, 0, false) > 0.0);
        assert_eq!(color_delta(&white, &white, 0, 0, false), 0.0);
    }
}
