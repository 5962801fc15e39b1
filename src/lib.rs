//! # pixrank
//!
//! Content-based image retrieval: rank a collection of images by visual
//! similarity to a target image.
//!
//! Each retrieval program pairs one feature extractor with one distance
//! metric. The pipeline describes the target, describes every corpus image in
//! parallel, and sorts the corpus by ascending distance.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! pixrank histogram photos/beach.jpg photos/ 5
//! pixrank scene photos/sunset.jpg photos/ embeddings.csv 5 --bottom 5
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use pixrank::prelude::*;
//! use std::path::Path;
//!
//! let config = RetrievalConfig::default();
//! let pipeline = RetrievalPipeline::new(
//!     FeatureExtractor::chromaticity(&config),
//!     Metric::HistogramIntersection,
//! )
//! .unwrap();
//!
//! let corpus = scan_directory(Path::new("photos")).unwrap();
//! let target = CorpusItem::from_path("photos/beach.jpg");
//! let ranking = pipeline.run(&target, &corpus, &ImageLoader::new()).unwrap();
//! for result in ranking.top(5) {
//!     println!("{} {:.4}", result.id, result.distance);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `pixrank-core` - Value types (Image, Vector, Descriptor, CorpusEntry), errors, collaborator traits
//! - `pixrank-similarity` - Extractors, metrics, ranker, pipeline, reports
//! - `pixrank-storage` - Image decoding, directory scanning, embedding CSV tables

// Re-export core types
pub use pixrank_core::{
    CompositeDescriptor, CorpusEntry, CorpusItem, Descriptor, EdgeDetector, EmbeddingSource,
    Error, Field, Image, ImageSource, Result, Shape, Vector,
};

// Re-export similarity
pub use pixrank_similarity::{
    CannyDetector, ExplainedResult, FeatureExtractor, FusionWeights, Metric, RankedResult,
    Ranker, Ranking, RankingReport, Region, RetrievalConfig, RetrievalPipeline, SceneWeights,
};

// Re-export storage
pub use pixrank_storage::{scan_directory, EmbeddingTable, ImageLoader};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        scan_directory, CannyDetector, CompositeDescriptor, CorpusEntry, CorpusItem, Descriptor,
        EmbeddingTable, Error, FeatureExtractor, Image, ImageLoader, Metric, RankedResult, Ranker,
        Ranking, RankingReport, Region, Result, RetrievalConfig, RetrievalPipeline, Vector,
    };
}

/// SIMD-optimized descriptor kernels
pub mod simd {
    pub use pixrank_core::simd::{
        dot_product_simd, min_sum_simd, norm_simd, squared_distance_simd,
    };
}
