//! Timeline persistence.
//!
//! Stores are written through: the sidecar once when the timeline is created,
//! then one flushed record per appended row.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::config::CameraSettings;
use crate::plate_engine::timeline::row::TimelineRow;
use crate::plate_engine::timeline::schedule::CaptureSchedule;

/// Sidecar content written once per timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    pub schedule: CaptureSchedule,
    pub camera: CameraSettings,
}

pub trait TimelineStore {
    fn initialize(&mut self, metadata: &TimelineMetadata) -> Result<()>;
    fn append_row(&mut self, row: &TimelineRow) -> Result<()>;
}

/// Keeps nothing; rows live only in the in-memory timeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl TimelineStore for NullStore {
    fn initialize(&mut self, _metadata: &TimelineMetadata) -> Result<()> {
        Ok(())
    }

    fn append_row(&mut self, _row: &TimelineRow) -> Result<()> {
        Ok(())
    }
}

/// `{stem}.csv` rows plus a `{stem}.json` sidecar in one directory.
pub struct CsvTimelineStore {
    csv_path: PathBuf,
    sidecar_path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl CsvTimelineStore {
    pub fn new<P: AsRef<Path>>(directory: P, stem: &str) -> Self {
        let directory = directory.as_ref();
        Self {
            csv_path: directory.join(format!("{}.csv", stem)),
            sidecar_path: directory.join(format!("{}.json", stem)),
            writer: None,
        }
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    /// Reads every row of a persisted timeline. Any malformed record fails
    /// the whole load.
    #[instrument]
    pub fn load_rows(path: &Path) -> Result<Vec<TimelineRow>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let expected = TimelineRow::csv_header();
        let header = reader.headers()?;
        if header.len() != expected.len() || header.iter().zip(&expected).any(|(a, b)| a != b.as_str()) {
            return Err(EngineError::DecodeError(format!(
                "{}: unexpected timeline header",
                path.display()
            )));
        }
        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            rows.push(TimelineRow::from_record(index, &record?)?);
        }
        debug!(rows = rows.len(), "Loaded timeline rows");
        Ok(rows)
    }

    #[instrument]
    pub fn load_metadata(path: &Path) -> Result<TimelineMetadata> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl TimelineStore for CsvTimelineStore {
    fn initialize(&mut self, metadata: &TimelineMetadata) -> Result<()> {
        if let Some(parent) = self.csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.sidecar_path, serde_json::to_string_pretty(metadata)?)?;

        let mut writer = csv::Writer::from_path(&self.csv_path)?;
        writer.write_record(TimelineRow::csv_header())?;
        writer.flush()?;
        self.writer = Some(writer);

        info!(
            csv = %self.csv_path.display(),
            sidecar = %self.sidecar_path.display(),
            "Timeline store initialized"
        );
        Ok(())
    }

    fn append_row(&mut self, row: &TimelineRow) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            EngineError::Validation("timeline store used before initialization".to_string())
        })?;
        writer.write_record(row.to_record())?;
        writer.flush()?;
        debug!(index = row.index, "Timeline row persisted");
        Ok(())
    }
}
