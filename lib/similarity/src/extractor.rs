//! Feature extractors
//!
//! A closed set of variants with one invocation contract:
//! `extract(id, image) -> Descriptor`. Extraction is deterministic and only
//! fails through an error value: a zero bin count, an image too small for the
//! extractor, or a missing embedding.

use crate::config::{RetrievalConfig, WarmClassifier};
use crate::gradient::gradient_magnitude_histogram;
use crate::histogram::{chromaticity_histogram, rgb_histogram, Region};
use crate::patch::center_patch;
use crate::scene::{self, EDGE_DENSITY, EMBEDDING, VERTICAL_GRADIENT, WARM_FRACTION};
use pixrank_core::{
    CompositeDescriptor, CorpusItem, Descriptor, EdgeDetector, EmbeddingSource, Error, Image,
    ImageSource, Result,
};
use std::fmt;
use std::sync::Arc;

pub const TOP: &str = "top";
pub const BOTTOM: &str = "bottom";
pub const COLOR: &str = "color";
pub const TEXTURE: &str = "texture";

#[derive(Debug, Clone)]
pub enum FeatureExtractor {
    /// Raw `size x size` RGB block around the image center
    CenterPatch { size: usize },
    /// rg-chromaticity histogram with `bins²` cells
    Chromaticity { bins: usize },
    /// RGB histogram with `bins³` cells over one band of rows
    RegionRgb { bins: usize, region: Region },
    /// Composite of top-half and bottom-half RGB histograms
    TopBottomRgb { bins: usize },
    /// Composite of a whole-image RGB histogram and a gradient magnitude histogram
    TextureColor { color_bins: usize, texture_bins: usize },
    /// Sobel gradient magnitude histogram with `bins` cells
    GradientMagnitude { bins: usize },
    /// Precomputed embedding looked up by identifier
    Embedding(EmbeddingPassthrough),
    /// Warm-scene composite: warm fraction, vertical gradient, edge density, embedding
    WarmScene(WarmSceneExtractor),
}

impl FeatureExtractor {
    pub fn center_patch(config: &RetrievalConfig) -> Self {
        FeatureExtractor::CenterPatch {
            size: config.patch_size,
        }
    }

    pub fn chromaticity(config: &RetrievalConfig) -> Self {
        FeatureExtractor::Chromaticity {
            bins: config.chromaticity_bins,
        }
    }

    pub fn region_rgb(config: &RetrievalConfig, region: Region) -> Self {
        FeatureExtractor::RegionRgb {
            bins: config.rgb_bins,
            region,
        }
    }

    pub fn top_bottom_rgb(config: &RetrievalConfig) -> Self {
        FeatureExtractor::TopBottomRgb {
            bins: config.rgb_bins,
        }
    }

    pub fn texture_color(config: &RetrievalConfig) -> Self {
        FeatureExtractor::TextureColor {
            color_bins: config.rgb_bins,
            texture_bins: config.texture_bins,
        }
    }

    pub fn gradient_magnitude(config: &RetrievalConfig) -> Self {
        FeatureExtractor::GradientMagnitude {
            bins: config.texture_bins,
        }
    }

    pub fn embedding(source: Arc<dyn EmbeddingSource>) -> Self {
        FeatureExtractor::Embedding(EmbeddingPassthrough::new(source))
    }

    pub fn warm_scene(
        config: &RetrievalConfig,
        edges: Arc<dyn EdgeDetector>,
        embeddings: Arc<dyn EmbeddingSource>,
    ) -> Self {
        FeatureExtractor::WarmScene(WarmSceneExtractor::new(config.warm, edges, embeddings))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeatureExtractor::CenterPatch { .. } => "center-patch",
            FeatureExtractor::Chromaticity { .. } => "chromaticity",
            FeatureExtractor::RegionRgb { .. } => "region-rgb",
            FeatureExtractor::TopBottomRgb { .. } => "top-bottom-rgb",
            FeatureExtractor::TextureColor { .. } => "texture-color",
            FeatureExtractor::GradientMagnitude { .. } => "gradient-magnitude",
            FeatureExtractor::Embedding(_) => "embedding",
            FeatureExtractor::WarmScene(_) => "warm-scene",
        }
    }

    /// Whether descriptors from this extractor are flat vectors
    pub fn produces_flat(&self) -> bool {
        !matches!(
            self,
            FeatureExtractor::TopBottomRgb { .. }
                | FeatureExtractor::TextureColor { .. }
                | FeatureExtractor::WarmScene(_)
        )
    }

    /// Whether pixels are needed at all; embeddings only need the identifier
    pub fn needs_pixels(&self) -> bool {
        !matches!(self, FeatureExtractor::Embedding(_))
    }

    /// Reject zero bin counts and an empty patch
    pub fn check_parameters(&self) -> Result<()> {
        let params = match self {
            FeatureExtractor::CenterPatch { size } => vec![("patch size", *size)],
            FeatureExtractor::Chromaticity { bins }
            | FeatureExtractor::RegionRgb { bins, .. }
            | FeatureExtractor::TopBottomRgb { bins }
            | FeatureExtractor::GradientMagnitude { bins } => vec![("bins", *bins)],
            FeatureExtractor::TextureColor {
                color_bins,
                texture_bins,
            } => vec![("color bins", *color_bins), ("texture bins", *texture_bins)],
            FeatureExtractor::Embedding(_) | FeatureExtractor::WarmScene(_) => Vec::new(),
        };
        match params.into_iter().find(|&(_, value)| value == 0) {
            Some((name, _)) => Err(Error::InvalidConfig(format!(
                "{} {} must be at least 1",
                self.name(),
                name
            ))),
            None => Ok(()),
        }
    }

    /// Describe the image identified by `id`
    pub fn extract(&self, id: &str, image: &Image) -> Result<Descriptor> {
        self.check_parameters()?;
        let descriptor = match self {
            FeatureExtractor::CenterPatch { size } => center_patch(image, *size)?.into(),
            FeatureExtractor::Chromaticity { bins } => chromaticity_histogram(image, *bins).into(),
            FeatureExtractor::RegionRgb { bins, region } => {
                rgb_histogram(image, *bins, *region).into()
            }
            FeatureExtractor::TopBottomRgb { bins } => {
                image.require_size(2, 1)?;
                CompositeDescriptor::new()
                    .with_vector(TOP, rgb_histogram(image, *bins, Region::TopHalf))
                    .with_vector(BOTTOM, rgb_histogram(image, *bins, Region::BottomHalf))
                    .into()
            }
            FeatureExtractor::TextureColor {
                color_bins,
                texture_bins,
            } => CompositeDescriptor::new()
                .with_vector(COLOR, rgb_histogram(image, *color_bins, Region::Whole))
                .with_vector(TEXTURE, gradient_magnitude_histogram(image, *texture_bins))
                .into(),
            FeatureExtractor::GradientMagnitude { bins } => {
                gradient_magnitude_histogram(image, *bins).into()
            }
            FeatureExtractor::Embedding(passthrough) => passthrough.lookup(id)?,
            FeatureExtractor::WarmScene(scene) => scene.extract(id, image)?,
        };
        Ok(descriptor)
    }

    /// Describe by identifier alone. Only embeddings can do this.
    pub fn extract_by_id(&self, id: &str) -> Option<Result<Descriptor>> {
        match self {
            FeatureExtractor::Embedding(passthrough) => Some(passthrough.lookup(id)),
            _ => None,
        }
    }

    /// Describe one corpus item, loading its pixels only when needed
    pub fn describe(&self, item: &CorpusItem, images: &dyn ImageSource) -> Result<Descriptor> {
        if let Some(descriptor) = self.extract_by_id(&item.id) {
            return descriptor;
        }
        let image = images.load(&item.path)?;
        self.extract(&item.id, &image)
    }
}

/// Wraps an external embedding source; a missing identifier is a
/// [`LookupMiss`](pixrank_core::Error::LookupMiss), never a zero vector.
#[derive(Clone)]
pub struct EmbeddingPassthrough {
    source: Arc<dyn EmbeddingSource>,
}

impl EmbeddingPassthrough {
    pub fn new(source: Arc<dyn EmbeddingSource>) -> Self {
        Self { source }
    }

    pub fn lookup(&self, id: &str) -> Result<Descriptor> {
        Ok(Descriptor::Flat(self.source.lookup(id)?))
    }
}

impl fmt::Debug for EmbeddingPassthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingPassthrough").finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct WarmSceneExtractor {
    classifier: WarmClassifier,
    edges: Arc<dyn EdgeDetector>,
    embeddings: Arc<dyn EmbeddingSource>,
}

impl WarmSceneExtractor {
    pub fn new(
        classifier: WarmClassifier,
        edges: Arc<dyn EdgeDetector>,
        embeddings: Arc<dyn EmbeddingSource>,
    ) -> Self {
        Self {
            classifier,
            edges,
            embeddings,
        }
    }

    pub fn extract(&self, id: &str, image: &Image) -> Result<Descriptor> {
        let embedding = self.embeddings.lookup(id)?;
        Ok(CompositeDescriptor::new()
            .with_scalar(WARM_FRACTION, scene::warm_fraction(image, &self.classifier)?)
            .with_scalar(VERTICAL_GRADIENT, scene::vertical_gradient(image)?)
            .with_scalar(EDGE_DENSITY, self.edges.edge_fraction(image))
            .with_vector(EMBEDDING, embedding)
            .into())
    }
}

impl fmt::Debug for WarmSceneExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarmSceneExtractor")
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::CannyDetector;
    use pixrank_core::{Field, Vector};
    use std::collections::HashMap;

    fn embeddings() -> Arc<dyn EmbeddingSource> {
        let mut map = HashMap::new();
        map.insert("sunset.jpg".to_string(), Vector::new(vec![0.1, 0.9, 0.3]));
        Arc::new(map)
    }

    /// Orange sky over a sea split into a dark left half and a bright right half
    fn sky() -> Image {
        Image::from_fn(12, 10, |r, c| {
            if r < 7 {
                [220, 110, 30]
            } else if c < 5 {
                [10, 30, 80]
            } else {
                [240, 240, 240]
            }
        })
    }

    #[test]
    fn test_flat_extractor_lengths() {
        let config = RetrievalConfig::default();
        let img = sky();
        let cases = [
            (FeatureExtractor::center_patch(&config), 147),
            (FeatureExtractor::chromaticity(&config), 256),
            (FeatureExtractor::region_rgb(&config, Region::Whole), 512),
            (FeatureExtractor::gradient_magnitude(&config), 16),
        ];
        for (extractor, len) in cases {
            assert!(extractor.produces_flat());
            let d = extractor.extract("x", &img).unwrap();
            assert_eq!(d.as_flat().map(Vector::dim), Some(len), "{}", extractor.name());
        }
    }

    #[test]
    fn test_zero_bins_are_rejected() {
        let config = RetrievalConfig {
            chromaticity_bins: 0,
            rgb_bins: 0,
            texture_bins: 0,
            patch_size: 0,
            ..RetrievalConfig::default()
        };
        let img = sky();
        let extractors = [
            FeatureExtractor::center_patch(&config),
            FeatureExtractor::chromaticity(&config),
            FeatureExtractor::region_rgb(&config, Region::TopHalf),
            FeatureExtractor::top_bottom_rgb(&config),
            FeatureExtractor::texture_color(&config),
            FeatureExtractor::gradient_magnitude(&config),
        ];
        for extractor in extractors {
            let result = extractor.extract("x", &img);
            assert!(
                matches!(result, Err(Error::InvalidConfig(_))),
                "{}",
                extractor.name()
            );
        }

        let texture_only = FeatureExtractor::TextureColor {
            color_bins: 8,
            texture_bins: 0,
        };
        assert!(matches!(
            texture_only.extract("x", &img),
            Err(Error::InvalidConfig(msg)) if msg.contains("texture bins")
        ));
    }

    #[test]
    fn test_top_bottom_composite() {
        let d = FeatureExtractor::top_bottom_rgb(&RetrievalConfig::default())
            .extract("x", &sky())
            .unwrap();
        let c = d.as_composite().unwrap();
        assert_eq!(c.fields()[0].0, TOP);
        assert_eq!(c.fields()[1].0, BOTTOM);
        assert_eq!(c.vector(TOP).map(Vector::dim), Some(512));
        assert!((c.vector(BOTTOM).unwrap().sum() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_top_bottom_needs_two_rows() {
        let result = FeatureExtractor::top_bottom_rgb(&RetrievalConfig::default())
            .extract("x", &Image::filled(1, 8, [1, 2, 3]));
        assert!(matches!(result, Err(Error::InsufficientImageSize { .. })));
    }

    #[test]
    fn test_texture_color_composite() {
        let d = FeatureExtractor::texture_color(&RetrievalConfig::default())
            .extract("x", &sky())
            .unwrap();
        let c = d.as_composite().unwrap();
        assert_eq!(c.vector(COLOR).map(Vector::dim), Some(512));
        assert_eq!(c.vector(TEXTURE).map(Vector::dim), Some(16));
    }

    #[test]
    fn test_embedding_passthrough() {
        let extractor = FeatureExtractor::embedding(embeddings());
        assert!(!extractor.needs_pixels());
        let d = extractor.extract_by_id("sunset.jpg").unwrap().unwrap();
        assert_eq!(d.as_flat().unwrap().as_slice(), &[0.1, 0.9, 0.3]);
        assert!(matches!(
            extractor.extract_by_id("missing.jpg"),
            Some(Err(Error::LookupMiss(_)))
        ));
        assert!(FeatureExtractor::chromaticity(&RetrievalConfig::default())
            .extract_by_id("sunset.jpg")
            .is_none());
    }

    #[test]
    fn test_warm_scene_fields() {
        let extractor = FeatureExtractor::warm_scene(
            &RetrievalConfig::default(),
            Arc::new(CannyDetector::default()),
            embeddings(),
        );
        assert!(!extractor.produces_flat());
        let d = extractor.extract("sunset.jpg", &sky()).unwrap();
        let c = d.as_composite().unwrap();
        let names: Vec<&str> = c.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![WARM_FRACTION, VERTICAL_GRADIENT, EDGE_DENSITY, EMBEDDING]);
        assert!(matches!(c.get(EMBEDDING), Some(Field::Vector(v)) if v.dim() == 3));
        assert!(c.scalar(WARM_FRACTION).unwrap() > 0.9);
        assert!(c.scalar(EDGE_DENSITY).unwrap() > 0.0);
    }

    #[test]
    fn test_warm_scene_missing_embedding_is_reported() {
        let extractor = FeatureExtractor::warm_scene(
            &RetrievalConfig::default(),
            Arc::new(CannyDetector::default()),
            embeddings(),
        );
        assert!(matches!(
            extractor.extract("other.jpg", &sky()),
            Err(Error::LookupMiss(id)) if id == "other.jpg"
        ));
    }
}
