//! Concrete collaborators for the retrieval core: image decoding, directory
//! corpora and embedding CSV tables.

pub mod embeddings;
pub mod loader;
pub mod scan;

pub use embeddings::EmbeddingTable;
pub use loader::ImageLoader;
pub use scan::{is_image_file, scan_directory, IMAGE_EXTENSIONS};
