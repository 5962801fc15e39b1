//! Canny-style edge detection used for the edge-density feature
//!
//! Sobel gradients, L1 magnitude, non-maximum suppression along the quantized
//! gradient direction, then double-threshold hysteresis over 8-connected
//! neighbours.

use crate::config::EdgeThresholds;
use crate::gradient::Gradients;
use pixrank_core::{EdgeDetector, Image};

// tan(22.5°) and tan(67.5°)
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

#[derive(Debug, Clone, Copy, Default)]
pub struct CannyDetector {
    thresholds: EdgeThresholds,
}

impl CannyDetector {
    pub fn new(thresholds: EdgeThresholds) -> Self {
        Self { thresholds }
    }

    /// Edge map of `image`, row-major, `true` where an edge was kept
    pub fn detect(&self, image: &Image) -> Vec<bool> {
        let (rows, cols) = (image.rows(), image.cols());
        if rows == 0 || cols == 0 {
            return Vec::new();
        }

        let gradients = Gradients::sobel(&image.to_gray());
        let magnitude = gradients.l1_magnitudes();
        let at = |r: isize, c: isize| -> f32 {
            if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                0.0
            } else {
                magnitude[r as usize * cols + c as usize]
            }
        };

        // Non-maximum suppression, keeping only candidates above the low threshold
        let mut candidate = vec![false; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let m = magnitude[row * cols + col];
                if m <= self.thresholds.low {
                    continue;
                }
                let gx = gradients.gx(row, col);
                let gy = gradients.gy(row, col);
                let (ax, ay) = (gx.abs(), gy.abs());
                let (r, c) = (row as isize, col as isize);

                let (a, b) = if ay <= ax * TAN_22_5 {
                    (at(r, c - 1), at(r, c + 1))
                } else if ay >= ax * TAN_67_5 {
                    (at(r - 1, c), at(r + 1, c))
                } else if (gx > 0.0) == (gy > 0.0) {
                    (at(r - 1, c - 1), at(r + 1, c + 1))
                } else {
                    (at(r - 1, c + 1), at(r + 1, c - 1))
                };

                candidate[row * cols + col] = m > a && m >= b;
            }
        }

        // Hysteresis: grow from strong pixels through connected candidates
        let mut edges = vec![false; rows * cols];
        let mut stack: Vec<usize> = (0..rows * cols)
            .filter(|&i| candidate[i] && magnitude[i] > self.thresholds.high)
            .collect();
        for &i in &stack {
            edges[i] = true;
        }

        while let Some(i) = stack.pop() {
            let (row, col) = ((i / cols) as isize, (i % cols) as isize);
            for dr in -1..=1 {
                for dc in -1..=1 {
                    let (r, c) = (row + dr, col + dc);
                    if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                        continue;
                    }
                    let j = r as usize * cols + c as usize;
                    if candidate[j] && !edges[j] {
                        edges[j] = true;
                        stack.push(j);
                    }
                }
            }
        }

        edges
    }
}

impl EdgeDetector for CannyDetector {
    fn edge_fraction(&self, image: &Image) -> f32 {
        let edges = self.detect(image);
        if edges.is_empty() {
            return 0.0;
        }
        edges.iter().filter(|&&e| e).count() as f32 / edges.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(rows: usize, cols: usize, low: u8, high: u8) -> Image {
        Image::from_fn(rows, cols, |_, c| {
            let v = if c < cols / 2 { low } else { high };
            [v, v, v]
        })
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let detector = CannyDetector::default();
        assert_eq!(detector.edge_fraction(&Image::filled(12, 12, [90, 90, 90])), 0.0);
    }

    #[test]
    fn test_step_edge_is_thin() {
        let detector = CannyDetector::default();
        let img = step(10, 20, 0, 200);
        let edges = detector.detect(&img);
        for row in 0..10 {
            let count = edges[row * 20..(row + 1) * 20].iter().filter(|&&e| e).count();
            assert!((1..=2).contains(&count), "row {} has {} edge pixels", row, count);
        }
        let fraction = detector.edge_fraction(&img);
        assert!(fraction > 0.0 && fraction <= 0.1);
    }

    #[test]
    fn test_weak_edge_below_low_threshold_is_ignored() {
        // A step of 10 gives an L1 magnitude of 40, under the default low of 50
        let detector = CannyDetector::default();
        assert_eq!(detector.edge_fraction(&step(10, 20, 100, 110)), 0.0);
    }

    #[test]
    fn test_empty_image() {
        let detector = CannyDetector::default();
        assert_eq!(detector.edge_fraction(&Image::filled(0, 0, [0, 0, 0])), 0.0);
    }
}
