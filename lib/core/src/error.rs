use crate::descriptor::Shape;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBuffer { expected: usize, actual: usize },

    #[error("Descriptor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },

    #[error("Metric {metric} cannot compare {shape} descriptors")]
    UnsupportedDescriptor { metric: &'static str, shape: Shape },

    #[error("No embedding found for: {0}")]
    LookupMiss(String),

    #[error("Image too small: need at least {min_rows}x{min_cols} (rows x cols), got {rows}x{cols}")]
    InsufficientImageSize {
        min_rows: usize,
        min_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed feature source at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a shape mismatch between two descriptors
    pub fn shape_mismatch(expected: Shape, actual: Shape) -> Self {
        Error::ShapeMismatch { expected, actual }
    }
}
