//! Color histograms
//!
//! Both histograms are probability mass functions: every cell is divided by
//! the number of pixels that contributed, so the cells sum to 1.0 unless no
//! pixel contributed at all (then every cell is 0).

use pixrank_core::{Image, Rgb, Vector};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Pixels with a channel sum below this carry no usable chromaticity
const MIN_INTENSITY: f32 = 1.0;

/// Horizontal band of an image a histogram is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Whole,
    /// Rows `0..rows/2`
    TopHalf,
    /// Rows `rows/2..rows`
    BottomHalf,
    /// An explicit row range, clamped to the image
    Rows { start: usize, end: usize },
}

impl Region {
    pub fn row_range(&self, rows: usize) -> Range<usize> {
        match *self {
            Region::Whole => 0..rows,
            Region::TopHalf => 0..rows / 2,
            Region::BottomHalf => rows / 2..rows,
            Region::Rows { start, end } => {
                let end = end.min(rows);
                start.min(end)..end
            }
        }
    }
}

/// 2-D rg-chromaticity histogram with `bins x bins` cells, indexed `r * bins + g`
pub fn chromaticity_histogram(image: &Image, bins: usize) -> Vector {
    let mut histogram = vec![0.0f32; bins * bins];
    let mut counted = 0usize;

    for [r, g, b] in image.pixels() {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        let intensity = r + g + b;
        if intensity < MIN_INTENSITY {
            continue;
        }
        let r_bin = chroma_bin(r / intensity, bins);
        let g_bin = chroma_bin(g / intensity, bins);
        histogram[r_bin * bins + g_bin] += 1.0;
        counted += 1;
    }

    normalize_counts(&mut histogram, counted);
    Vector::new(histogram)
}

#[inline]
fn chroma_bin(chroma: f32, bins: usize) -> usize {
    ((chroma * bins as f32) as usize).min(bins - 1)
}

/// 3-D RGB histogram with `bins³` cells over the rows of `region`,
/// indexed `r * bins² + g * bins + b`
pub fn rgb_histogram(image: &Image, bins: usize, region: Region) -> Vector {
    let mut histogram = vec![0.0f32; bins * bins * bins];
    let rows = region.row_range(image.rows());
    let mut counted = 0usize;

    for pixel in image.rows_iter(rows.start, rows.end) {
        histogram[rgb_index(pixel, bins)] += 1.0;
        counted += 1;
    }

    normalize_counts(&mut histogram, counted);
    Vector::new(histogram)
}

#[inline]
fn rgb_index([r, g, b]: Rgb, bins: usize) -> usize {
    let bin = |c: u8| ((c as usize * bins) / 256).min(bins - 1);
    bin(r) * bins * bins + bin(g) * bins + bin(b)
}

/// Divide counts by the number of contributing samples; no-op when there were none
pub(crate) fn normalize_counts(histogram: &mut [f32], counted: usize) {
    if counted == 0 {
        return;
    }
    let total = counted as f32;
    for cell in histogram.iter_mut() {
        *cell /= total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_pmf(h: &Vector) {
        assert!((h.sum() - 1.0).abs() < 1e-4, "sum was {}", h.sum());
    }

    fn gradient_image() -> Image {
        Image::from_fn(12, 16, |r, c| [(r * 20) as u8, (c * 15) as u8, ((r + c) * 7) as u8])
    }

    #[test]
    fn test_chromaticity_sums_to_one() {
        let h = chromaticity_histogram(&gradient_image(), 16);
        assert_eq!(h.dim(), 256);
        assert_pmf(&h);
    }

    #[test]
    fn test_chromaticity_all_black_is_all_zero() {
        let h = chromaticity_histogram(&Image::filled(8, 8, [0, 0, 0]), 16);
        assert_eq!(h.dim(), 256);
        assert!(h.as_slice().iter().all(|&x| x == 0.0));
        assert!(h.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_chromaticity_skips_dark_pixels_in_normalization() {
        // Half black, half pure red
        let img = Image::from_fn(2, 2, |r, _| if r == 0 { [0, 0, 0] } else { [255, 0, 0] });
        let h = chromaticity_histogram(&img, 4);
        // r̂ = 1.0 clamps to the last bin, ĝ = 0
        assert_eq!(h.as_slice()[3 * 4], 1.0);
        assert_pmf(&h);
    }

    #[test]
    fn test_chromaticity_is_brightness_invariant() {
        let dim = chromaticity_histogram(&Image::filled(4, 4, [40, 20, 20]), 16);
        let bright = chromaticity_histogram(&Image::filled(4, 4, [200, 100, 100]), 16);
        assert_eq!(dim, bright);
    }

    #[test]
    fn test_rgb_histogram_bins() {
        let img = Image::filled(4, 4, [255, 0, 128]);
        let h = rgb_histogram(&img, 8, Region::Whole);
        assert_eq!(h.dim(), 512);
        // 255 -> bin 7, 0 -> bin 0, 128 -> bin 4
        assert_eq!(h.as_slice()[7 * 64 + 4], 1.0);
    }

    #[test]
    fn test_rgb_histogram_regions() {
        let img = Image::from_fn(4, 3, |r, _| if r < 2 { [255, 255, 255] } else { [0, 0, 0] });
        let top = rgb_histogram(&img, 8, Region::TopHalf);
        let bottom = rgb_histogram(&img, 8, Region::BottomHalf);
        assert_eq!(top.as_slice()[511], 1.0);
        assert_eq!(bottom.as_slice()[0], 1.0);
        assert_pmf(&top);
        assert_pmf(&bottom);
        assert_pmf(&rgb_histogram(&gradient_image(), 8, Region::Whole));
    }

    #[test]
    fn test_empty_region_is_all_zero() {
        let img = Image::filled(1, 5, [10, 10, 10]);
        let top = rgb_histogram(&img, 8, Region::TopHalf);
        assert_eq!(top.sum(), 0.0);
    }

    #[test]
    fn test_region_row_ranges() {
        assert_eq!(Region::Whole.row_range(5), 0..5);
        assert_eq!(Region::TopHalf.row_range(5), 0..2);
        assert_eq!(Region::BottomHalf.row_range(5), 2..5);
        assert_eq!(Region::Rows { start: 3, end: 99 }.row_range(5), 3..5);
        assert_eq!(Region::Rows { start: 9, end: 99 }.row_range(5), 5..5);
    }
}
