use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::plate_engine::capture::source::FrameSource;
use crate::plate_engine::common::error::Result;
use crate::plate_engine::snapshot::extractor::WellColorExtractor;
use crate::plate_engine::timeline::store::TimelineStore;
use crate::plate_engine::timeline::tracker::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Rows appended by this run
    pub captured: usize,
    pub completed: bool,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Drives one timeline: capture, extract, append, then wait for the next
/// scheduled slot. A capture starts only after the previous append returned.
pub struct CaptureSession<F: FrameSource, S: TimelineStore> {
    source: F,
    extractor: WellColorExtractor,
    timeline: Timeline<S>,
    running: Arc<AtomicBool>,
    calibrate_on_baseline: bool,
}

impl<F: FrameSource, S: TimelineStore> CaptureSession<F, S> {
    pub fn new(source: F, extractor: WellColorExtractor, timeline: Timeline<S>) -> Self {
        Self {
            source,
            extractor,
            timeline,
            running: Arc::new(AtomicBool::new(true)),
            calibrate_on_baseline: false,
        }
    }

    /// Calibrate color correction from the baseline frame before it is appended.
    pub fn with_baseline_calibration(mut self, enabled: bool) -> Self {
        self.calibrate_on_baseline = enabled;
        self
    }

    /// Uses a run flag owned by the caller instead of a fresh one.
    pub fn with_run_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Shared run flag; storing `false` stops the loop before its next capture.
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn timeline(&self) -> &Timeline<S> {
        &self.timeline
    }

    pub fn extractor(&mut self) -> &mut WellColorExtractor {
        &mut self.extractor
    }

    pub fn into_parts(self) -> (F, WellColorExtractor, Timeline<S>) {
        (self.source, self.extractor, self.timeline)
    }

    /// Captures until the timeline is complete or the run flag is cleared.
    /// A failing capture or append ends the run with that error; rows
    /// appended before it stay in the timeline.
    #[instrument(skip(self), fields(end_count = self.timeline.end_count()))]
    pub async fn run(&mut self) -> Result<CaptureSummary> {
        let started = Instant::now();
        let mut captured = 0;
        let mut cancelled = false;

        while !self.timeline.is_complete() {
            if !self.is_running() {
                cancelled = true;
                break;
            }
            let count = self.timeline.current_count();
            let wait = self.timeline.schedule().interval_before(count).unwrap_or_default();
            if !wait.is_zero() {
                debug!(count, wait_secs = wait.as_secs(), "Waiting for next capture");
                sleep(wait).await;
            }
            if !self.is_running() {
                cancelled = true;
                break;
            }
            self.capture_once().await?;
            captured += 1;
        }

        let summary = CaptureSummary {
            captured,
            completed: self.timeline.is_complete(),
            cancelled,
            elapsed: started.elapsed(),
        };
        if cancelled {
            warn!(captured, rows = self.timeline.current_count(), "Capture run cancelled");
        } else {
            info!(captured, elapsed_secs = summary.elapsed.as_secs(), "Capture run complete");
        }
        Ok(summary)
    }

    async fn capture_once(&mut self) -> Result<()> {
        let frame = self.source.capture_frame()?;
        let geometry = *self.extractor.geometry();
        self.extractor.set_source_image(frame, geometry)?;
        if self.calibrate_on_baseline && self.timeline.current_count() == 0 {
            self.extractor.calibrate()?;
        }
        let row = self.timeline.append_snapshot(&mut self.extractor)?;
        info!(
            index = row.index,
            elapsed_seconds = row.elapsed_seconds,
            "Capture appended"
        );
        tokio::task::yield_now().await;
        Ok(())
    }
}
