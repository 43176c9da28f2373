//! Timeline module
//!
//! Append-only, schedule-driven series of well color samples with color
//! distance from the baseline and relative velocity per well.

pub mod schedule;
pub mod row;
pub mod store;
pub mod tracker;


pub use schedule::{CaptureRound, CaptureSchedule};
pub use row::{TimelineRow, WellMetrics};
pub use store::{CsvTimelineStore, NullStore, TimelineMetadata, TimelineStore};
pub use tracker::{CaptureContext, Timeline};
