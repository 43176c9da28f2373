//! Capture schedule types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plate_engine::common::error::{EngineError, Result};

/// `count` captures spaced `interval_seconds` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCaptureRound")]
pub struct CaptureRound {
    interval_seconds: u64,
    count: u32,
}

#[derive(Deserialize)]
struct RawCaptureRound {
    interval_seconds: i64,
    count: i64,
}

impl TryFrom<RawCaptureRound> for CaptureRound {
    type Error = EngineError;

    fn try_from(raw: RawCaptureRound) -> Result<Self> {
        Self::new(raw.interval_seconds, raw.count)
    }
}

impl CaptureRound {
    pub fn new(interval_seconds: i64, count: i64) -> Result<Self> {
        if interval_seconds <= 0 {
            return Err(EngineError::Validation(format!(
                "round interval must be positive, got {}",
                interval_seconds
            )));
        }
        if count <= 0 || count > u32::MAX as i64 {
            return Err(EngineError::Validation(format!(
                "round count must be positive, got {}",
                count
            )));
        }
        Ok(Self {
            interval_seconds: interval_seconds as u64,
            count: count as u32,
        })
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }
}

/// Ordered rounds following the baseline capture.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureSchedule {
    rounds: Vec<CaptureRound>,
}

impl CaptureSchedule {
    pub fn new(rounds: Vec<CaptureRound>) -> Self {
        Self { rounds }
    }

    /// Builds a schedule from `(interval_seconds, count)` pairs, rejecting
    /// the whole schedule if any round is invalid.
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Result<Self> {
        let rounds = pairs
            .iter()
            .map(|&(interval, count)| CaptureRound::new(interval, count))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rounds })
    }

    pub fn rounds(&self) -> &[CaptureRound] {
        &self.rounds
    }

    /// Total rows including the baseline.
    pub fn end_count(&self) -> usize {
        1 + self.rounds.iter().map(CaptureRound::count).sum::<usize>()
    }

    /// Seconds from the baseline to capture number `count` (0 = baseline),
    /// saturating at `u64::MAX`.
    pub fn elapsed_for(&self, count: usize) -> u64 {
        let mut remaining = count;
        let mut elapsed: u64 = 0;
        for round in &self.rounds {
            let taken = remaining.min(round.count());
            elapsed = elapsed.saturating_add((taken as u64).saturating_mul(round.interval_seconds));
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        elapsed
    }

    /// Round that capture number `count` belongs to. The baseline is counted
    /// with the first round; past the end there is none.
    pub fn round_for(&self, count: usize) -> Option<usize> {
        if count >= self.end_count() {
            return None;
        }
        let mut cumulative = 0;
        for (index, round) in self.rounds.iter().enumerate() {
            cumulative += round.count();
            if count <= cumulative {
                return Some(index);
            }
        }
        None
    }

    /// Wait between the previous capture and capture number `count`.
    pub fn interval_before(&self, count: usize) -> Option<Duration> {
        if count == 0 {
            return Some(Duration::ZERO);
        }
        self.round_for(count).map(|index| self.rounds[index].interval())
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs(self.elapsed_for(self.end_count() - 1))
    }
}
