//! Retrieval configuration
//!
//! Every tunable constant an extractor or metric uses is carried here as an
//! explicit value. Weight sets are validated and re-normalized to sum to 1.0
//! before use.

use serde::{Deserialize, Serialize};

/// All knobs for the retrieval programs, loadable from JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Side of the square center patch
    pub patch_size: usize,
    /// Bins per axis of the rg-chromaticity histogram
    pub chromaticity_bins: usize,
    /// Bins per channel of the RGB histograms
    pub rgb_bins: usize,
    /// Bins of the gradient magnitude histogram
    pub texture_bins: usize,
    pub fusion: FusionWeights,
    pub scene: SceneWeights,
    pub edges: EdgeThresholds,
    pub warm: WarmClassifier,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            patch_size: 7,
            chromaticity_bins: 16,
            rgb_bins: 8,
            texture_bins: 16,
            fusion: FusionWeights::default(),
            scene: SceneWeights::default(),
            edges: EdgeThresholds::default(),
            warm: WarmClassifier::default(),
        }
    }
}

impl RetrievalConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: RetrievalConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate_and_normalize()?;
        Ok(config)
    }

    /// Validate bin counts and sizes, normalize weight sets
    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("patch_size", self.patch_size),
            ("chromaticity_bins", self.chromaticity_bins),
            ("rgb_bins", self.rgb_bins),
            ("texture_bins", self.texture_bins),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        if self.rgb_bins > 256 {
            return Err(ConfigError::OutOfRange("rgb_bins"));
        }
        self.fusion.validate_and_normalize()?;
        self.scene.validate_and_normalize()?;
        self.edges.validate()?;
        self.warm.validate()?;
        Ok(())
    }
}

/// Weights of a two-term histogram fusion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FusionWeights {
    pub first: f32,
    pub second: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            first: 0.5,
            second: 0.5,
        }
    }
}

impl FusionWeights {
    pub fn new(first: f32, second: f32) -> Self {
        Self { first, second }
    }

    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        let mut weights = [("first", &mut self.first), ("second", &mut self.second)];
        normalize(&mut weights)
    }
}

/// Weights of the warm-scene distance terms
///
/// The defaults (40/20/10/30 and a gradient scale of 50) are empirical tuning
/// values for sunset-like scenes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneWeights {
    pub warm: f32,
    pub gradient: f32,
    pub edge: f32,
    pub embedding: f32,
    /// Divides the raw vertical gradient difference before weighting
    pub gradient_scale: f32,
}

impl Default for SceneWeights {
    fn default() -> Self {
        Self {
            warm: 0.40,
            gradient: 0.20,
            edge: 0.10,
            embedding: 0.30,
            gradient_scale: 50.0,
        }
    }
}

impl SceneWeights {
    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        if !(self.gradient_scale > 0.0) {
            return Err(ConfigError::OutOfRange("gradient_scale"));
        }
        let mut weights = [
            ("warm", &mut self.warm),
            ("gradient", &mut self.gradient),
            ("edge", &mut self.edge),
            ("embedding", &mut self.embedding),
        ];
        normalize(&mut weights)
    }
}

/// Hysteresis thresholds of the edge detector, on the L1 gradient magnitude
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 150.0,
        }
    }
}

impl EdgeThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.low >= 0.0) || !(self.high >= self.low) {
            return Err(ConfigError::OutOfRange("edges"));
        }
        Ok(())
    }
}

/// Rule deciding whether a pixel counts as "warm" (red/orange/yellow)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarmClassifier {
    /// Fraction of rows, from the top, that are inspected
    pub upper_fraction: f32,
    /// Red must exceed this value
    pub min_red: u8,
    /// Red must exceed green times this ratio
    pub red_green_ratio: f32,
}

impl Default for WarmClassifier {
    fn default() -> Self {
        Self {
            upper_fraction: 0.6,
            min_red: 100,
            red_green_ratio: 1.2,
        }
    }
}

impl WarmClassifier {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.upper_fraction > 0.0 && self.upper_fraction <= 1.0) {
            return Err(ConfigError::OutOfRange("warm.upper_fraction"));
        }
        if !(self.red_green_ratio >= 0.0) {
            return Err(ConfigError::OutOfRange("warm.red_green_ratio"));
        }
        Ok(())
    }

    /// R > G ≥ B, R above the floor and R well above G
    #[inline]
    pub fn is_warm(&self, [r, g, b]: [u8; 3]) -> bool {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        r > g && g >= b && r > self.min_red as f32 && r > g * self.red_green_ratio
    }
}

fn normalize(weights: &mut [(&'static str, &mut f32)]) -> Result<(), ConfigError> {
    for (name, weight) in weights.iter() {
        if !(**weight >= 0.0) {
            return Err(ConfigError::NegativeWeight(*name));
        }
    }

    let weight_sum: f32 = weights.iter().map(|(_, w)| **w).sum();
    if weight_sum <= 0.0 {
        return Err(ConfigError::ZeroTotalWeight);
    }

    if (weight_sum - 1.0).abs() > 0.001 {
        for (_, weight) in weights.iter_mut() {
            **weight /= weight_sum;
        }
    }
    Ok(())
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration is not valid JSON: {0}")]
    Parse(String),

    #[error("Weight '{0}' is negative")]
    NegativeWeight(&'static str),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,

    #[error("'{0}' must be greater than zero")]
    Zero(&'static str),

    #[error("'{0}' is out of range")]
    OutOfRange(&'static str),
}

impl From<ConfigError> for pixrank_core::Error {
    fn from(e: ConfigError) -> Self {
        pixrank_core::Error::InvalidConfig(e.to_string())
    }
}
