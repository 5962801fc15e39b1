//! Distance metrics between descriptors
//!
//! All metrics return a distance (0.0 means identical, larger means less
//! similar). Comparing descriptors of different shapes is an error, never a
//! sentinel distance.

use crate::config::{FusionWeights, SceneWeights};
use crate::scene::{EDGE_DENSITY, EMBEDDING, VERTICAL_GRADIENT, WARM_FRACTION};
use pixrank_core::simd::{min_sum_simd, squared_distance_simd};
use pixrank_core::{CompositeDescriptor, Descriptor, Error, Field, Result, Vector};
use serde::{Deserialize, Serialize};

/// Σ(aᵢ−bᵢ)²
pub fn sum_squared_distance(a: &Vector, b: &Vector) -> Result<f32> {
    a.check_dim(b)?;
    Ok(squared_distance_simd(a.as_slice(), b.as_slice()))
}

/// `1 − Σ min(aᵢ, bᵢ)`, in `[0, 1]` for two probability mass functions.
///
/// Inputs that are not mass functions get the plain formula, which can be
/// negative when the intersection exceeds 1.
pub fn histogram_intersection_distance(a: &Vector, b: &Vector) -> Result<f32> {
    a.check_dim(b)?;
    let intersection = min_sum_simd(a.as_slice(), b.as_slice());
    Ok(1.0 - intersection)
}

/// `1 − cos θ` of the L2-normalized vectors, in `[0, 2]`.
///
/// A zero vector normalizes to itself, giving cos θ = 0. A non-finite cosine
/// (infinite or NaN components) is treated the same way.
pub fn cosine_distance(a: &Vector, b: &Vector) -> Result<f32> {
    let cos = a.normalized().dot(&b.normalized())?;
    let cos = if cos.is_finite() {
        cos.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    Ok(1.0 - cos)
}

/// Weighted histogram-intersection distances of the two histograms of a pair
pub fn fused_histogram_distance(
    a: &CompositeDescriptor,
    b: &CompositeDescriptor,
    weights: &FusionWeights,
) -> Result<f32> {
    let [first, second] = fused_terms(a, b, weights)?;
    Ok(first + second)
}

/// Weighted warm-scene distance:
/// `w·|Δwarm| + w·|Δgradient|/scale + w·|Δedge| + w·cosine(embeddings)`
pub fn weighted_scene_distance(
    a: &CompositeDescriptor,
    b: &CompositeDescriptor,
    weights: &SceneWeights,
) -> Result<f32> {
    Ok(scene_terms(a, b, weights)?.iter().sum())
}

fn fused_terms(
    a: &CompositeDescriptor,
    b: &CompositeDescriptor,
    weights: &FusionWeights,
) -> Result<[f32; 2]> {
    check_same_shape(a, b)?;
    let (a0, a1, b0, b1) = match (a.fields(), b.fields()) {
        (
            [(_, Field::Vector(a0)), (_, Field::Vector(a1))],
            [(_, Field::Vector(b0)), (_, Field::Vector(b1))],
        ) => (a0, a1, b0, b1),
        _ => {
            return Err(Error::UnsupportedDescriptor {
                metric: "fused-histogram",
                shape: a.shape(),
            })
        }
    };

    let first = histogram_intersection_distance(a0, b0)?;
    let second = histogram_intersection_distance(a1, b1)?;
    Ok([weights.first * first, weights.second * second])
}

fn scene_terms(
    a: &CompositeDescriptor,
    b: &CompositeDescriptor,
    weights: &SceneWeights,
) -> Result<[f32; 4]> {
    check_same_shape(a, b)?;
    let unsupported = || Error::UnsupportedDescriptor {
        metric: "weighted-scene",
        shape: a.shape(),
    };
    let scalar = |c: &CompositeDescriptor, name: &str| c.scalar(name).ok_or_else(unsupported);

    let warm = (scalar(a, WARM_FRACTION)? - scalar(b, WARM_FRACTION)?).abs();
    let gradient = (scalar(a, VERTICAL_GRADIENT)? - scalar(b, VERTICAL_GRADIENT)?).abs();
    let edge = (scalar(a, EDGE_DENSITY)? - scalar(b, EDGE_DENSITY)?).abs();
    let embedding = cosine_distance(
        a.vector(EMBEDDING).ok_or_else(unsupported)?,
        b.vector(EMBEDDING).ok_or_else(unsupported)?,
    )?;

    Ok([
        weights.warm * warm,
        weights.gradient * (gradient / weights.gradient_scale),
        weights.edge * edge,
        weights.embedding * embedding,
    ])
}

fn check_same_shape(a: &CompositeDescriptor, b: &CompositeDescriptor) -> Result<()> {
    let (shape_a, shape_b) = (a.shape(), b.shape());
    if shape_a != shape_b {
        return Err(Error::shape_mismatch(shape_a, shape_b));
    }
    Ok(())
}

/// The closed set of distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metric {
    /// Sum of squared differences over flat vectors
    SumSquared,
    /// `1 − Σ min` over flat histograms
    HistogramIntersection,
    /// `1 − cos θ` over flat vectors
    Cosine,
    /// Weighted intersection distances over a two-histogram composite
    FusedHistogram(FusionWeights),
    /// Weighted warm-scene terms over a scene composite
    WeightedScene(SceneWeights),
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::SumSquared => "sum-squared",
            Metric::HistogramIntersection => "histogram-intersection",
            Metric::Cosine => "cosine",
            Metric::FusedHistogram(_) => "fused-histogram",
            Metric::WeightedScene(_) => "weighted-scene",
        }
    }

    /// Whether this metric compares flat vectors (as opposed to composites)
    pub fn takes_flat(&self) -> bool {
        matches!(
            self,
            Metric::SumSquared | Metric::HistogramIntersection | Metric::Cosine
        )
    }

    /// Distance between two descriptors of the same shape
    pub fn distance(&self, a: &Descriptor, b: &Descriptor) -> Result<f32> {
        match self {
            Metric::SumSquared => {
                let (a, b) = self.flat_pair(a, b)?;
                sum_squared_distance(a, b)
            }
            Metric::HistogramIntersection => {
                let (a, b) = self.flat_pair(a, b)?;
                histogram_intersection_distance(a, b)
            }
            Metric::Cosine => {
                let (a, b) = self.flat_pair(a, b)?;
                cosine_distance(a, b)
            }
            Metric::FusedHistogram(weights) => {
                let (a, b) = self.composite_pair(a, b)?;
                fused_histogram_distance(a, b, weights)
            }
            Metric::WeightedScene(weights) => {
                let (a, b) = self.composite_pair(a, b)?;
                weighted_scene_distance(a, b, weights)
            }
        }
    }

    /// Per-term (already weighted) contributions to the distance.
    ///
    /// Single-term metrics return one entry named after the metric; the
    /// contributions always sum to [`Metric::distance`].
    pub fn terms(&self, a: &Descriptor, b: &Descriptor) -> Result<Vec<(String, f32)>> {
        match self {
            Metric::FusedHistogram(weights) => {
                let (ca, cb) = self.composite_pair(a, b)?;
                let values = fused_terms(ca, cb, weights)?;
                Ok(ca
                    .fields()
                    .iter()
                    .map(|(name, _)| name.clone())
                    .zip(values)
                    .collect())
            }
            Metric::WeightedScene(weights) => {
                let (ca, cb) = self.composite_pair(a, b)?;
                let values = scene_terms(ca, cb, weights)?;
                Ok([WARM_FRACTION, VERTICAL_GRADIENT, EDGE_DENSITY, EMBEDDING]
                    .iter()
                    .map(|name| name.to_string())
                    .zip(values)
                    .collect())
            }
            _ => Ok(vec![(self.name().to_string(), self.distance(a, b)?)]),
        }
    }

    fn flat_pair<'a>(&self, a: &'a Descriptor, b: &'a Descriptor) -> Result<(&'a Vector, &'a Vector)> {
        match (a, b) {
            (Descriptor::Flat(a), Descriptor::Flat(b)) => Ok((a, b)),
            (Descriptor::Flat(_), other) | (other, _) => Err(Error::UnsupportedDescriptor {
                metric: self.name(),
                shape: other.shape(),
            }),
        }
    }

    fn composite_pair<'a>(
        &self,
        a: &'a Descriptor,
        b: &'a Descriptor,
    ) -> Result<(&'a CompositeDescriptor, &'a CompositeDescriptor)> {
        match (a, b) {
            (Descriptor::Composite(a), Descriptor::Composite(b)) => Ok((a, b)),
            (Descriptor::Composite(_), other) | (other, _) => Err(Error::UnsupportedDescriptor {
                metric: self.name(),
                shape: other.shape(),
            }),
        }
    }
}
