//! Directory corpus enumeration
//!
//! Lists the image files directly inside a directory, ordered by file name so
//! tie-breaking in the ranker is the same on every platform.

use pixrank_core::{CorpusItem, Error, Result};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions recognized as images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "ppm", "tif", "tiff"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Image files directly inside `dir` (not recursive), sorted by file name
pub fn scan_directory(dir: &Path) -> Result<Vec<CorpusItem>> {
    if !dir.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut items = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image_file(entry.path()) {
                    items.push(CorpusItem::from_path(entry.path()));
                }
            }
            Err(e) => tracing::warn!("Error accessing entry: {}", e),
        }
    }

    tracing::debug!("Found {} images in {}", items.len(), dir.display());
    Ok(items)
}
