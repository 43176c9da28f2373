use tracing::debug;

use crate::plate_engine::color::space::space_channels;
use crate::plate_engine::color::types::{ColorSpace, euclidean};
use crate::plate_engine::common::grid::WellGrid;
use crate::plate_engine::snapshot::WellColorSample;

/// Per-well distances between two samples, with both grids expressed in the
/// compared space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDistanceResult {
    pub space: ColorSpace,
    pub target: WellGrid<[f64; 3]>,
    pub control: WellGrid<[f64; 3]>,
    pub distances: WellGrid<f64>,
}

impl ColorDistanceResult {
    pub fn mean_distance(&self) -> f64 {
        let values = self.distances.as_slice();
        values.iter().sum::<f64>() / values.len().max(1) as f64
    }

    pub fn max_distance(&self) -> f64 {
        self.distances.iter().copied().fold(0.0, f64::max)
    }
}

/// Converts both samples into `space` (RGB passes through) and measures the
/// Euclidean distance of every well.
pub fn color_distance(
    target: &WellColorSample,
    control: &WellColorSample,
    space: ColorSpace,
) -> ColorDistanceResult {
    let target = target.map(|rgb| space_channels(*rgb, space));
    let control = control.map(|rgb| space_channels(*rgb, space));
    let distances = target.zip_map(&control, |t, c| euclidean(*t, *c));
    let result = ColorDistanceResult {
        space,
        target,
        control,
        distances,
    };
    debug!(
        space = space.as_str(),
        mean = result.mean_distance(),
        "Color distance computed"
    );
    result
}
