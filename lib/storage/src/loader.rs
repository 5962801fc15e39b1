//! Image decoding backed by the `image` crate

use pixrank_core::{Error, Image, ImageSource, Result};
use std::path::Path;

/// Decodes any format the `image` crate understands into 8-bit RGB
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageSource for ImageLoader {
    fn load(&self, path: &Path) -> Result<Image> {
        let decoded = image::open(path).map_err(|e| Error::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rgb = decoded.into_rgb8();
        let (cols, rows) = (rgb.width() as usize, rgb.height() as usize);
        if rows == 0 || cols == 0 {
            return Err(Error::Decode {
                path: path.display().to_string(),
                reason: "image has no pixels".to_string(),
            });
        }
        Image::from_raw(rows, cols, rgb.into_raw()).map_err(|e| Error::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_png_round_trip_keeps_channel_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let img = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        img.save(&path).unwrap();

        let loaded = ImageLoader::new().load(&path).unwrap();
        assert_eq!(loaded.rows(), 3);
        assert_eq!(loaded.cols(), 5);
        assert_eq!(loaded.pixel(2, 4), [40, 40, 7]);
    }

    #[test]
    fn test_unreadable_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = ImageLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(matches!(
            ImageLoader::new().load(&dir.path().join("missing.png")),
            Err(Error::Decode { .. })
        ));
    }
}
