//! Boundary contracts for the collaborators the retrieval core calls into.
//!
//! Concrete implementations live in `pixrank-storage` (decoding, CSV tables)
//! and `pixrank-similarity` (edge detection).

use crate::error::Result;
use crate::image::Image;
use crate::vector::Vector;
use std::collections::HashMap;
use std::path::Path;

/// Decodes images from disk
pub trait ImageSource: Send + Sync {
    /// Load the image at `path`, failing with [`Error::Decode`](crate::Error::Decode)
    fn load(&self, path: &Path) -> Result<Image>;
}

/// Precomputed embeddings keyed by image identifier
pub trait EmbeddingSource: Send + Sync {
    /// Exact-match lookup. A missing identifier is
    /// [`Error::LookupMiss`](crate::Error::LookupMiss), never a default vector.
    fn lookup(&self, id: &str) -> Result<Vector>;
}

/// Fraction of pixels an edge detector marks as edges
pub trait EdgeDetector: Send + Sync {
    /// Value in `[0, 1]`
    fn edge_fraction(&self, image: &Image) -> f32;
}

impl EmbeddingSource for HashMap<String, Vector> {
    fn lookup(&self, id: &str) -> Result<Vector> {
        self.get(id)
            .cloned()
            .ok_or_else(|| crate::Error::LookupMiss(id.to_string()))
    }
}
