//! Engine configuration types

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::snapshot::correction::ReferenceMode;

/// TIFF compression for the persisted custom-mask layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced (default)
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Tunables shared by the extractor, timeline and persistence layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Radius in pixels of the disk averaged around each well center
    pub radius: f64,
    /// Pixels with any channel above this value are treated as flare
    pub flare_threshold: u8,
    /// Stand-in for a zero previous distance when computing velocity
    pub velocity_epsilon: f64,
    /// Compression of the persisted free-hand mask
    pub mask_compression: MaskCompression,
    /// Source of the Lab correction reference
    pub reference_mode: ReferenceMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radius: 35.0,
            flare_threshold: 230,
            velocity_epsilon: 1e-6,
            mask_compression: MaskCompression::DeflateBalanced,
            reference_mode: ReferenceMode::WholePlate,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Loads a JSON config file; omitted fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "Loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(EngineError::Validation(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.velocity_epsilon.is_finite() || self.velocity_epsilon <= 0.0 {
            return Err(EngineError::Validation(format!(
                "velocity_epsilon must be positive, got {}",
                self.velocity_epsilon
            )));
        }
        Ok(())
    }
}

/// Builder for EngineConfig
#[derive(Default)]
pub struct EngineConfigBuilder {
    radius: Option<f64>,
    flare_threshold: Option<u8>,
    velocity_epsilon: Option<f64>,
    mask_compression: Option<MaskCompression>,
    reference_mode: Option<ReferenceMode>,
}

impl EngineConfigBuilder {
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn flare_threshold(mut self, threshold: u8) -> Self {
        self.flare_threshold = Some(threshold);
        self
    }

    pub fn velocity_epsilon(mut self, epsilon: f64) -> Self {
        self.velocity_epsilon = Some(epsilon);
        self
    }

    pub fn mask_compression(mut self, compression: MaskCompression) -> Self {
        self.mask_compression = Some(compression);
        self
    }

    pub fn reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.reference_mode = Some(mode);
        self
    }

    pub fn build(self) -> EngineConfig {
        let default = EngineConfig::default();
        EngineConfig {
            radius: self.radius.unwrap_or(default.radius),
            flare_threshold: self.flare_threshold.unwrap_or(default.flare_threshold),
            velocity_epsilon: self.velocity_epsilon.unwrap_or(default.velocity_epsilon),
            mask_compression: self.mask_compression.unwrap_or(default.mask_compression),
            reference_mode: self.reference_mode.unwrap_or(default.reference_mode),
        }
    }
}

/// Camera parameters recorded alongside a timeline. The engine never
/// interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub device: String,
    pub exposure_us: u32,
    pub gain: f64,
    pub white_balance_kelvin: Option<u32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            exposure_us: 10_000,
            gain: 1.0,
            white_balance_kelvin: None,
        }
    }
}
