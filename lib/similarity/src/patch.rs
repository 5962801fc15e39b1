//! Center patch feature: the raw pixels of a small square around the image center

use pixrank_core::{Image, Result, Vector};

/// Flatten the `size x size` block centered at `(rows/2, cols/2)`.
///
/// Row-major, channels in R, G, B order, length `size * size * 3`. For even
/// sizes the block extends one pixel further up/left than down/right.
pub fn center_patch(image: &Image, size: usize) -> Result<Vector> {
    image.require_size(size, size)?;

    let half = size / 2;
    let top = (image.rows() / 2 - half).min(image.rows() - size);
    let left = (image.cols() / 2 - half).min(image.cols() - size);

    let mut features = Vec::with_capacity(size * size * 3);
    for row in top..top + size {
        for col in left..left + size {
            features.extend(image.pixel(row, col).iter().map(|&c| c as f32));
        }
    }
    Ok(Vector::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixrank_core::Error;

    #[test]
    fn test_patch_length_and_order() {
        let img = Image::from_fn(9, 9, |r, c| [r as u8, c as u8, 200]);
        let patch = center_patch(&img, 7).unwrap();
        assert_eq!(patch.dim(), 147);
        // First pixel is (center - 3, center - 3) = (1, 1)
        assert_eq!(&patch.as_slice()[..3], &[1.0, 1.0, 200.0]);
        // Last pixel is (7, 7)
        assert_eq!(&patch.as_slice()[144..], &[7.0, 7.0, 200.0]);
    }

    #[test]
    fn test_patch_on_exact_size_image() {
        let img = Image::from_fn(7, 7, |r, c| [r as u8, c as u8, 0]);
        let patch = center_patch(&img, 7).unwrap();
        assert_eq!(&patch.as_slice()[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&patch.as_slice()[144..], &[6.0, 6.0, 0.0]);
    }

    #[test]
    fn test_patch_centered_on_integer_division() {
        // 10 rows: center row 5, block rows 2..=8
        let img = Image::from_fn(10, 10, |r, c| [r as u8, c as u8, 0]);
        let patch = center_patch(&img, 7).unwrap();
        assert_eq!(&patch.as_slice()[..2], &[2.0, 2.0]);
        assert_eq!(&patch.as_slice()[144..146], &[8.0, 8.0]);
    }

    #[test]
    fn test_patch_too_small_image() {
        let img = Image::filled(5, 20, [0, 0, 0]);
        assert!(matches!(
            center_patch(&img, 7),
            Err(Error::InsufficientImageSize { .. })
        ));
    }
}
