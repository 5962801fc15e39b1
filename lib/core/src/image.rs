//! In-memory RGB image
//!
//! The retrieval core only needs the grid dimensions and per-pixel channel
//! access; decoding lives behind [`ImageSource`](crate::ImageSource).

use crate::error::{Error, Result};

/// One pixel: `[red, green, blue]`
pub type Rgb = [u8; 3];

/// A row-major grid of RGB pixels with the origin at the top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap an interleaved RGB buffer of `rows * cols * 3` bytes
    pub fn from_raw(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self> {
        let expected = rows * cols * 3;
        if data.len() != expected {
            return Err(Error::PixelBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build an image by evaluating `f(row, col)` for every pixel
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Rgb,
    {
        let mut data = Vec::with_capacity(rows * cols * 3);
        for row in 0..rows {
            for col in 0..cols {
                data.extend_from_slice(&f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    /// An image where every pixel has the same color
    pub fn filled(rows: usize, cols: usize, pixel: Rgb) -> Self {
        Self::from_fn(rows, cols, |_, _| pixel)
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
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Pixel at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> Rgb {
        let offset = (row * self.cols + col) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    /// Pixels of rows `start..end`, in row-major order
    pub fn rows_iter(&self, start: usize, end: usize) -> impl Iterator<Item = Rgb> + '_ {
        let end = end.min(self.rows);
        let start = start.min(end);
        self.data[start * self.cols * 3..end * self.cols * 3]
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// All pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.rows_iter(0, self.rows)
    }

    /// Fail unless the image is at least `min_rows x min_cols`
    pub fn require_size(&self, min_rows: usize, min_cols: usize) -> Result<()> {
        if self.rows < min_rows || self.cols < min_cols {
            return Err(Error::InsufficientImageSize {
                min_rows,
                min_cols,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Single-channel intensity using BT.601 luma weights
    pub fn to_gray(&self) -> GrayImage {
        let data = self
            .pixels()
            .map(|[r, g, b]| 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
            .map(f32::round)
            .collect();
        GrayImage {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }
}

/// Single-channel image of intensities in `[0, 255]`
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl GrayImage {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// Intensity with reflect-101 border handling (`gfedcb|abcdefgh|gfedcba`)
    #[inline]
    pub fn get_reflected(&self, row: isize, col: isize) -> f32 {
        self.get(reflect_101(row, self.rows), reflect_101(col, self.cols))
    }
}

#[inline]
fn reflect_101(i: isize, len: usize) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as usize
}
