//! Warm-scene cues: how much of the sky is warm-colored and how the color
//! changes from the top of the frame to the bottom.

use crate::config::WarmClassifier;
use pixrank_core::{Image, Result};

pub const WARM_FRACTION: &str = "warm_fraction";
pub const VERTICAL_GRADIENT: &str = "vertical_gradient";
pub const EDGE_DENSITY: &str = "edge_density";
pub const EMBEDDING: &str = "embedding";

/// Thirds need at least one row each
pub const MIN_SCENE_ROWS: usize = 3;

/// Fraction of pixels in the upper band of the image classified as warm
pub fn warm_fraction(image: &Image, classifier: &WarmClassifier) -> Result<f32> {
    image.require_size(MIN_SCENE_ROWS, 1)?;

    let end_row = ((image.rows() as f32 * classifier.upper_fraction) as usize).max(1);
    let mut warm = 0usize;
    let mut total = 0usize;
    for pixel in image.rows_iter(0, end_row) {
        if classifier.is_warm(pixel) {
            warm += 1;
        }
        total += 1;
    }
    Ok(warm as f32 / total as f32)
}

/// `(meanR_top - meanR_bottom) + 0.5 * (meanG_top - meanG_bottom)` over the top
/// and bottom thirds. Positive when the top of the frame is warmer.
pub fn vertical_gradient(image: &Image) -> Result<f32> {
    image.require_size(MIN_SCENE_ROWS, 1)?;

    let rows = image.rows();
    let (top_r, top_g) = mean_red_green(image, 0, rows / 3);
    let (bottom_r, bottom_g) = mean_red_green(image, (2 * rows) / 3, rows);
    Ok((top_r - bottom_r) + 0.5 * (top_g - bottom_g))
}

fn mean_red_green(image: &Image, start: usize, end: usize) -> (f32, f32) {
    let mut sum_r = 0.0f64;
    let mut sum_g = 0.0f64;
    let mut count = 0usize;
    for [r, g, _] in image.rows_iter(start, end) {
        sum_r += r as f64;
        sum_g += g as f64;
        count += 1;
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    ((sum_r / count as f64) as f32, (sum_g / count as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixrank_core::Error;

    fn sunset() -> Image {
        // Orange sky over a dark blue sea
        Image::from_fn(10, 8, |r, _| if r < 6 { [230, 120, 40] } else { [20, 40, 90] })
    }

    #[test]
    fn test_warm_fraction_of_sunset() {
        let warm = warm_fraction(&sunset(), &WarmClassifier::default()).unwrap();
        // Upper 60% is exactly the six orange rows
        assert!((warm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_warm_fraction_partial() {
        let img = Image::from_fn(10, 4, |_, c| if c < 1 { [230, 120, 40] } else { [50, 50, 50] });
        let warm = warm_fraction(&img, &WarmClassifier::default()).unwrap();
        assert!((warm - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_gradient() {
        // Top third rows 0..3 orange, bottom third rows 6..10 blue
        let grad = vertical_gradient(&sunset()).unwrap();
        let expected = (230.0 - 20.0) + 0.5 * (120.0 - 40.0);
        assert!((grad - expected).abs() < 1e-3);
    }

    #[test]
    fn test_uniform_image_has_no_gradient() {
        let grad = vertical_gradient(&Image::filled(9, 9, [80, 80, 80])).unwrap();
        assert_eq!(grad, 0.0);
    }

    #[test]
    fn test_too_few_rows() {
        let img = Image::filled(2, 10, [200, 100, 50]);
        assert!(matches!(
            vertical_gradient(&img),
            Err(Error::InsufficientImageSize { .. })
        ));
        assert!(warm_fraction(&img, &WarmClassifier::default()).is_err());
    }
}
