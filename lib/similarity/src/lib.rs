//! # pixrank Similarity
//!
//! Content-based image retrieval: feature extractors, distance metrics and a
//! stable ranker, composed into a retrieval pipeline.
//!
//! ## Features
//!
//! - **Feature extractors**: center patch, rg-chromaticity and RGB histograms,
//!   gradient-magnitude (texture) histograms, precomputed embeddings and a
//!   warm-scene composite
//! - **Distance metrics**: sum of squared differences, histogram intersection,
//!   cosine, and weighted fusions over composite descriptors
//! - **Ranking**: parallel distance computation, stable ascending sort, top-K
//!   and bottom-K selection, skipped entries reported rather than hidden
//! - **Explainability**: per-term contributions for fused metrics
//!
//! ## Example
//!
//! ```rust
//! use pixrank_similarity::{FeatureExtractor, Metric, Ranker, RetrievalConfig};
//! use pixrank_core::{CorpusEntry, Image};
//!
//! let config = RetrievalConfig::default();
//! let extractor = FeatureExtractor::chromaticity(&config);
//!
//! let sky = Image::filled(8, 8, [40, 80, 220]);
//! let grass = Image::filled(8, 8, [30, 200, 40]);
//! let query = extractor.extract("query", &sky).unwrap();
//! let corpus = vec![
//!     CorpusEntry::new("grass", extractor.extract("grass", &grass).unwrap()),
//!     CorpusEntry::new("sky", extractor.extract("sky", &sky).unwrap()),
//! ];
//!
//! let results = Ranker::new(Metric::HistogramIntersection).rank(&query, corpus, 1);
//! assert_eq!(results[0].id, "sky");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Image     │────>│  Extractor  │────>│ Descriptor  │
//! │  (pixels)   │     │ (image→d)   │     │ flat/compos.│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Ranker    │<──────────┘
//!                      │  (metric)   │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Explain    │
//!                      │  (report)   │
//!                      └─────────────┘
//! ```

pub mod config;
pub mod distance;
pub mod edges;
pub mod explain;
pub mod extractor;
pub mod gradient;
pub mod histogram;
pub mod patch;
pub mod pipeline;
pub mod rank;
pub mod scene;

// Re-export main types for convenience
pub use config::{
    ConfigError, EdgeThresholds, FusionWeights, RetrievalConfig, SceneWeights, WarmClassifier,
};
pub use distance::{
    cosine_distance, fused_histogram_distance, histogram_intersection_distance,
    sum_squared_distance, weighted_scene_distance, Metric,
};
pub use edges::CannyDetector;
pub use explain::{ExplainedResult, RankingReport, SkippedReport};
pub use extractor::{EmbeddingPassthrough, FeatureExtractor, WarmSceneExtractor};
pub use histogram::Region;
pub use pipeline::{describe_corpus, RetrievalPipeline};
pub use rank::{RankedResult, Ranker, Ranking, SkippedEntry};
