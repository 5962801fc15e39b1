//! Sobel gradients and the gradient-magnitude (texture) histogram

use crate::histogram::normalize_counts;
use pixrank_core::{GrayImage, Image, Vector};

/// Horizontal and vertical 3x3 Sobel responses of a grayscale image
#[derive(Debug, Clone)]
pub struct Gradients {
    rows: usize,
    cols: usize,
    gx: Vec<f32>,
    gy: Vec<f32>,
}

impl Gradients {
    /// Apply the Sobel operator with reflect-101 borders
    pub fn sobel(gray: &GrayImage) -> Self {
        let (rows, cols) = (gray.rows(), gray.cols());
        let mut gx = Vec::with_capacity(rows * cols);
        let mut gy = Vec::with_capacity(rows * cols);

        for row in 0..rows as isize {
            for col in 0..cols as isize {
                let p = |dr: isize, dc: isize| gray.get_reflected(row + dr, col + dc);
                // Separable: [1 2 1] smoothing across, [-1 0 1] derivative along
                gx.push(
                    (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1)),
                );
                gy.push(
                    (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1)),
                );
            }
        }

        Self { rows, cols, gx, gy }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn gx(&self, row: usize, col: usize) -> f32 {
        self.gx[row * self.cols + col]
    }

    #[inline]
    pub fn gy(&self, row: usize, col: usize) -> f32 {
        self.gy[row * self.cols + col]
    }

    /// Euclidean magnitude `sqrt(gx² + gy²)` per pixel, row-major
    pub fn magnitudes(&self) -> Vec<f32> {
        self.gx
            .iter()
            .zip(&self.gy)
            .map(|(x, y)| (x * x + y * y).sqrt())
            .collect()
    }

    /// L1 magnitude `|gx| + |gy|` per pixel, row-major
    pub fn l1_magnitudes(&self) -> Vec<f32> {
        self.gx
            .iter()
            .zip(&self.gy)
            .map(|(x, y)| x.abs() + y.abs())
            .collect()
    }
}

/// Histogram of Sobel gradient magnitudes over `[0, max]` in `bins` equal bins.
///
/// A uniform image has a maximum magnitude of 0; every pixel then lands in bin 0.
pub fn gradient_magnitude_histogram(image: &Image, bins: usize) -> Vector {
    let magnitudes = Gradients::sobel(&image.to_gray()).magnitudes();
    let max = magnitudes.iter().copied().fold(0.0f32, f32::max);

    let mut histogram = vec![0.0f32; bins];
    for &mag in &magnitudes {
        let bin = if max > 0.0 {
            ((mag / max * bins as f32) as usize).min(bins - 1)
        } else {
            0
        };
        histogram[bin] += 1.0;
    }

    normalize_counts(&mut histogram, magnitudes.len());
    Vector::new(histogram)
}
