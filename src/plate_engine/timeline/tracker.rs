use tracing::{debug, info, warn};

use crate::plate_engine::color::space::{lab_grid, rgb_grid_from_lab};
use crate::plate_engine::color::types::RgbColor;
use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::WellGrid;
use crate::plate_engine::config::{CameraSettings, EngineConfig};
use crate::plate_engine::geometry::plate_geometry::PlateGeometry;
use crate::plate_engine::mask::layers::BoolMask;
use crate::plate_engine::snapshot::WellColorSample;
use crate::plate_engine::snapshot::correction::ColorCorrectionFactors;
use crate::plate_engine::snapshot::extractor::WellColorExtractor;
use crate::plate_engine::timeline::row::{TimelineRow, WellMetrics};
use crate::plate_engine::timeline::schedule::CaptureSchedule;
use crate::plate_engine::timeline::store::{NullStore, TimelineMetadata, TimelineStore};

/// Plate layout and hand-painted mask used for the most recent capture,
/// kept for live redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureContext {
    pub geometry: PlateGeometry,
    pub radius: f64,
    pub flare_threshold: u8,
    pub custom_mask: BoolMask,
}

pub struct Timeline<S: TimelineStore = NullStore> {
    schedule: CaptureSchedule,
    rows: Vec<TimelineRow>,
    store: S,
    velocity_epsilon: f64,
    last_capture: Option<CaptureContext>,
}

impl Timeline<NullStore> {
    /// In-memory timeline.
    pub fn new(schedule: CaptureSchedule) -> Self {
        Self {
            schedule,
            rows: Vec::new(),
            store: NullStore,
            velocity_epsilon: EngineConfig::default().velocity_epsilon,
            last_capture: None,
        }
    }

    /// In-memory timeline from `(interval_seconds, count)` rounds.
    pub fn init(rounds: &[(i64, i64)]) -> Result<Self> {
        Ok(Self::new(CaptureSchedule::from_pairs(rounds)?))
    }
}

impl<S: TimelineStore> Timeline<S> {
    /// Creates a timeline and writes its sidecar through `store`.
    pub fn with_store(schedule: CaptureSchedule, mut store: S, camera: CameraSettings) -> Result<Self> {
        let metadata = TimelineMetadata {
            schedule: schedule.clone(),
            camera,
        };
        store.initialize(&metadata)?;
        info!(
            rounds = schedule.rounds().len(),
            end_count = schedule.end_count(),
            "Timeline created"
        );
        Ok(Self {
            schedule,
            rows: Vec::new(),
            store,
            velocity_epsilon: EngineConfig::default().velocity_epsilon,
            last_capture: None,
        })
    }

    pub fn with_velocity_epsilon(mut self, epsilon: f64) -> Self {
        self.velocity_epsilon = epsilon;
        self
    }

    pub fn schedule(&self) -> &CaptureSchedule {
        &self.schedule
    }

    pub fn current_count(&self) -> usize {
        self.rows.len()
    }

    /// Round the next capture belongs to, `None` once complete.
    pub fn current_round_index(&self) -> Option<usize> {
        self.schedule.round_for(self.current_count())
    }

    /// Scheduled seconds from the baseline to the next capture.
    pub fn elapsed_time(&self) -> u64 {
        self.schedule.elapsed_for(self.current_count())
    }

    pub fn end_count(&self) -> usize {
        self.schedule.end_count()
    }

    pub fn is_complete(&self) -> bool {
        self.current_count() >= self.end_count()
    }

    pub fn rows(&self) -> &[TimelineRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Result<&TimelineRow> {
        self.rows
            .get(index)
            .ok_or_else(|| EngineError::NotFound(format!("timeline row {}", index)))
    }

    pub fn last_capture(&self) -> Option<&CaptureContext> {
        self.last_capture.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends the extractor's current sample and correction, remembering its
    /// plate layout and custom mask.
    pub fn append_snapshot(&mut self, extractor: &mut WellColorExtractor) -> Result<&TimelineRow> {
        let sample = extractor.mean_colors()?.clone();
        let correction = extractor.correction_factors().cloned();
        let context = CaptureContext {
            geometry: *extractor.geometry(),
            radius: extractor.radius(),
            flare_threshold: extractor.flare_threshold(),
            custom_mask: extractor.custom_mask().clone(),
        };
        let row = self.append(&sample, correction.as_ref())?.index;
        self.last_capture = Some(context);
        self.row(row)
    }

    /// Computes, persists and records one row. Past `end_count()` the call is
    /// rejected with `TimelineComplete` and nothing changes.
    pub fn append(
        &mut self,
        sample: &WellColorSample,
        correction: Option<&ColorCorrectionFactors>,
    ) -> Result<&TimelineRow> {
        if self.is_complete() {
            warn!(end_count = self.end_count(), "Append rejected, timeline complete");
            return Err(EngineError::TimelineComplete {
                end_count: self.end_count(),
            });
        }

        let index = self.current_count();
        let raw = self.metrics(
            sample.clone(),
            self.rows.first().map(|row| &row.raw.rgb),
            self.rows.last().map(|row| &row.raw.distance),
        );

        let corrected = correction.map(|factors| {
            let corrected_rgb = corrected_rgb_of(sample, factors);
            let baseline = self.rows.first().map(|row| match &row.corrected {
                Some(metrics) => metrics.rgb.clone(),
                None => corrected_rgb_of(&row.raw.rgb, factors),
            });
            let previous = self
                .rows
                .last()
                .and_then(|row| row.corrected.as_ref())
                .map(|metrics| &metrics.distance);
            // Without a corrected previous row there is no velocity to report.
            let previous_missing = index >= 1 && previous.is_none();
            let mut metrics = self.metrics(corrected_rgb, baseline.as_ref(), previous);
            if previous_missing {
                metrics.velocity = WellGrid::filled(0.0);
            }
            metrics
        });

        let row = TimelineRow {
            index,
            elapsed_seconds: self.schedule.elapsed_for(index),
            raw,
            corrected,
        };
        self.store.append_row(&row)?;
        debug!(
            index,
            elapsed_seconds = row.elapsed_seconds,
            corrected = row.corrected.is_some(),
            "Timeline row appended"
        );
        self.rows.push(row);
        self.row(index)
    }

    fn metrics(
        &self,
        rgb: WellGrid<RgbColor>,
        baseline: Option<&WellGrid<RgbColor>>,
        previous_distance: Option<&WellGrid<f64>>,
    ) -> WellMetrics {
        let distance = match baseline {
            Some(baseline) => rgb.zip_map(baseline, |current, base| current.distance(base)),
            None => WellGrid::filled(0.0),
        };
        // Velocity needs two distances after the baseline.
        let velocity = match previous_distance {
            Some(previous) if self.rows.len() >= 2 => distance.zip_map(previous, |current, prev| {
                color_velocity(*prev, *current, self.velocity_epsilon)
            }),
            _ => WellGrid::filled(0.0),
        };
        WellMetrics {
            rgb,
            distance,
            velocity,
        }
    }
}

fn corrected_rgb_of(rgb: &WellGrid<RgbColor>, factors: &ColorCorrectionFactors) -> WellGrid<RgbColor> {
    rgb_grid_from_lab(&factors.apply(&lab_grid(rgb)))
}

/// Relative change of distance; a zero previous distance is replaced by
/// `epsilon` and any non-finite result reads as 0.
pub(crate) fn color_velocity(previous: f64, current: f64, epsilon: f64) -> f64 {
    let denominator = if previous == 0.0 { epsilon } else { previous };
    let velocity = (current - previous) / denominator;
    if velocity.is_finite() { velocity } else { 0.0 }
}
