//! Retrieval pipeline: one extractor, one metric, the ranker
//!
//! Failures on the query are returned to the caller. Failures on corpus
//! images (decode errors, missing embeddings, undersized images) are logged
//! and reported as skipped entries; they never abort the run.

use crate::distance::Metric;
use crate::extractor::FeatureExtractor;
use crate::rank::{Ranker, Ranking, SkippedEntry};
use pixrank_core::{CorpusEntry, CorpusItem, Descriptor, Error, ImageSource, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Log progress every this many corpus images
pub const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
pub struct RetrievalPipeline {
    extractor: FeatureExtractor,
    ranker: Ranker,
}

impl RetrievalPipeline {
    /// Pair an extractor with a metric. Flat extractors need flat metrics and
    /// composite extractors need composite metrics.
    pub fn new(extractor: FeatureExtractor, metric: Metric) -> Result<Self> {
        extractor.check_parameters()?;
        if extractor.produces_flat() != metric.takes_flat() {
            return Err(Error::InvalidConfig(format!(
                "metric {} cannot compare {} descriptors",
                metric.name(),
                extractor.name()
            )));
        }
        Ok(Self {
            extractor,
            ranker: Ranker::new(metric),
        })
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.ranker = self.ranker.with_explain(explain);
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn metric(&self) -> &Metric {
        self.ranker.metric()
    }

    /// Describe the query. Any error here is fatal to the run.
    pub fn describe_query(&self, target: &CorpusItem, images: &dyn ImageSource) -> Result<Descriptor> {
        tracing::info!("Describing query {} with {}", target.id, self.extractor.name());
        self.extractor.describe(target, images)
    }

    /// Rank corpus images against an already described query
    pub fn rank_images(
        &self,
        query: &Descriptor,
        items: &[CorpusItem],
        images: &dyn ImageSource,
    ) -> Ranking {
        let (entries, skipped) = describe_corpus(&self.extractor, items, images);
        let mut ranking = self.ranker.rank_all(query, entries);
        ranking.extend_skipped(skipped);
        ranking
    }

    /// Rank precomputed descriptors against the query
    pub fn rank_descriptors(&self, query: &Descriptor, entries: Vec<CorpusEntry>) -> Ranking {
        self.ranker.rank_all(query, entries)
    }

    /// Describe the target, then rank the corpus against it
    pub fn run(
        &self,
        target: &CorpusItem,
        items: &[CorpusItem],
        images: &dyn ImageSource,
    ) -> Result<Ranking> {
        let query = self.describe_query(target, images)?;
        Ok(self.rank_images(&query, items, images))
    }
}

/// Describe every corpus item in parallel, keeping enumeration order.
/// Items that fail are logged and returned separately.
pub fn describe_corpus(
    extractor: &FeatureExtractor,
    items: &[CorpusItem],
    images: &dyn ImageSource,
) -> (Vec<CorpusEntry>, Vec<SkippedEntry>) {
    let total = items.len();
    let processed = AtomicUsize::new(0);

    let described: Vec<(String, Result<Descriptor>)> = items
        .par_iter()
        .map(|item| {
            let descriptor = extractor.describe(item, images);
            let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if n % PROGRESS_INTERVAL == 0 {
                tracing::info!("Processed {}/{} images", n, total);
            }
            (item.id.clone(), descriptor)
        })
        .collect();

    let mut entries = Vec::with_capacity(described.len());
    let mut skipped = Vec::new();
    for (id, descriptor) in described {
        match descriptor {
            Ok(descriptor) => entries.push(CorpusEntry { id, descriptor }),
            Err(error) => {
                tracing::warn!("Skipping {}: {}", id, error);
                skipped.push(SkippedEntry { id, error });
            }
        }
    }
    tracing::info!(
        "Described {} of {} corpus images ({} skipped)",
        entries.len(),
        total,
        skipped.len()
    );
    (entries, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use pixrank_core::{Image, Vector};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;

    /// In-memory images keyed by path; unknown paths fail to decode
    struct MemoryImages(HashMap<String, Image>);

    impl ImageSource for MemoryImages {
        fn load(&self, path: &Path) -> Result<Image> {
            let key = path.to_string_lossy().to_string();
            self.0.get(&key).cloned().ok_or_else(|| Error::Decode {
                path: key,
                reason: "not in memory".to_string(),
            })
        }
    }

    fn images() -> MemoryImages {
        let mut map = HashMap::new();
        map.insert("red.png".to_string(), Image::filled(10, 10, [200, 20, 20]));
        map.insert("red2.png".to_string(), Image::filled(10, 10, [200, 20, 20]));
        map.insert("green.png".to_string(), Image::filled(10, 10, [20, 200, 20]));
        map.insert("tiny.png".to_string(), Image::filled(3, 3, [200, 20, 20]));
        MemoryImages(map)
    }

    fn items(names: &[&str]) -> Vec<CorpusItem> {
        names.iter().map(|n| CorpusItem::from_path(*n)).collect()
    }

    #[test]
    fn test_rejects_incompatible_metric() {
        let config = RetrievalConfig::default();
        let result = RetrievalPipeline::new(
            FeatureExtractor::top_bottom_rgb(&config),
            Metric::SumSquared,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_bins() {
        let config = RetrievalConfig {
            chromaticity_bins: 0,
            ..RetrievalConfig::default()
        };
        let result = RetrievalPipeline::new(
            FeatureExtractor::chromaticity(&config),
            Metric::HistogramIntersection,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_identical_image_ranks_first() {
        let config = RetrievalConfig::default();
        let pipeline =
            RetrievalPipeline::new(FeatureExtractor::chromaticity(&config), Metric::HistogramIntersection)
                .unwrap();
        let source = images();
        let ranking = pipeline
            .run(
                &CorpusItem::from_path("red.png"),
                &items(&["green.png", "red.png"]),
                &source,
            )
            .unwrap();
        assert_eq!(ranking.top(1)[0].id, "red.png");
        assert!(ranking.top(1)[0].distance.abs() < 1e-5);
        assert!((ranking.results()[1].distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let config = RetrievalConfig::default();
        let pipeline =
            RetrievalPipeline::new(FeatureExtractor::center_patch(&config), Metric::SumSquared).unwrap();
        let source = images();
        let ranking = pipeline
            .run(
                &CorpusItem::from_path("red.png"),
                &items(&["missing.png", "red2.png", "tiny.png", "green.png"]),
                &source,
            )
            .unwrap();

        assert_eq!(
            ranking.results().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["red2.png", "green.png"]
        );
        let skipped: Vec<&str> = ranking.skipped().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["missing.png", "tiny.png"]);
        assert!(matches!(ranking.skipped()[0].error, Error::Decode { .. }));
        assert!(matches!(
            ranking.skipped()[1].error,
            Error::InsufficientImageSize { .. }
        ));
    }

    #[test]
    fn test_query_failure_is_fatal() {
        let config = RetrievalConfig::default();
        let pipeline =
            RetrievalPipeline::new(FeatureExtractor::center_patch(&config), Metric::SumSquared).unwrap();
        let source = images();
        assert!(pipeline
            .run(&CorpusItem::from_path("tiny.png"), &items(&["red.png"]), &source)
            .is_err());
    }

    #[test]
    fn test_embeddings_need_no_pixels() {
        let mut table = HashMap::new();
        table.insert("a".to_string(), Vector::new(vec![1.0, 0.0]));
        table.insert("b".to_string(), Vector::new(vec![0.0, 1.0]));
        let pipeline =
            RetrievalPipeline::new(FeatureExtractor::embedding(Arc::new(table)), Metric::Cosine).unwrap();
        let source = MemoryImages(HashMap::new());

        let ranking = pipeline
            .run(
                &CorpusItem::new("a", "a"),
                &[
                    CorpusItem::new("b", "b"),
                    CorpusItem::new("a", "a"),
                    CorpusItem::new("zero-filled", "zero-filled"),
                ],
                &source,
            )
            .unwrap();
        assert_eq!(ranking.top(1)[0].id, "a");
        assert!((ranking.results()[1].distance - 1.0).abs() < 1e-6);
        assert!(matches!(ranking.skipped()[0].error, Error::LookupMiss(_)));
    }
}
