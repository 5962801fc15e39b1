//! # pixrank Core
//!
//! Core library for the pixrank image retrieval tools.
//!
//! This crate provides the value types every retrieval pipeline shares:
//!
//! - [`Image`] - Decoded RGB pixel grid
//! - [`Vector`] - Flat feature vector
//! - [`Descriptor`] - Flat or composite (named fields) image summary
//! - [`CorpusEntry`] - An identified descriptor
//! - [`ImageSource`], [`EmbeddingSource`], [`EdgeDetector`] - Collaborator contracts
//!
//! ## Example
//!
//! ```rust
//! use pixrank_core::{CompositeDescriptor, Descriptor, Vector};
//!
//! let flat: Descriptor = Vector::new(vec![0.25, 0.75]).into();
//! assert_eq!(flat.shape().to_string(), "flat[2]");
//!
//! let scene = CompositeDescriptor::new()
//!     .with_scalar("warm_fraction", 0.4)
//!     .with_vector("embedding", Vector::zeros(512));
//! assert_eq!(scene.scalar("warm_fraction"), Some(0.4));
//! ```

pub mod corpus;
pub mod descriptor;
pub mod error;
pub mod image;
pub mod source;
pub mod vector;

/// SIMD-optimized descriptor kernels
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use corpus::{file_name_id, CorpusEntry, CorpusItem};
pub use descriptor::{CompositeDescriptor, Descriptor, Field, FieldShape, Shape};
pub use error::{Error, Result};
pub use image::{GrayImage, Image, Rgb};
pub use source::{EdgeDetector, EmbeddingSource, ImageSource};
pub use vector::Vector;
