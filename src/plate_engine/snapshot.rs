//! Snapshot module
//!
//! Per-image well color extraction: crop, mask, average, convert to Lab and
//! apply the reference-based Lab correction.

pub mod correction;
pub mod extractor;

#[cfg(test)]
mod tests;

use crate::plate_engine::color::types::RgbColor;
use crate::plate_engine::common::grid::WellGrid;

/// Mean RGB of every well from one captured image.
pub type WellColorSample = WellGrid<RgbColor>;

pub use correction::{
    ColorCorrectionFactors, CorrectionFactor, ReferenceMode, apply_correction, plate_mean_lab,
};
pub use extractor::WellColorExtractor;
