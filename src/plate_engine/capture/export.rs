use std::path::PathBuf;

use tokio::task::JoinHandle;
use tracing::{debug, info_span};

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::difference::report::{NamedSample, export_report};
use crate::plate_engine::difference::writer::ReportWriter;

/// Pending background export.
pub struct ExportHandle {
    handle: JoinHandle<Result<Vec<PathBuf>>>,
}

impl ExportHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the export and returns the files it wrote.
    pub async fn wait(self) -> Result<Vec<PathBuf>> {
        self.handle
            .await
            .map_err(|e| EngineError::TaskFailed(format!("report export: {}", e)))?
    }
}

/// Builds the difference report and writes it on the blocking pool. The
/// samples are moved in, so the caller's extractors stay free for capture.
pub fn export_in_background<W>(
    writer: W,
    samples: Vec<NamedSample>,
    control_name: String,
    destination: PathBuf,
) -> ExportHandle
where
    W: ReportWriter + Send + 'static,
{
    debug!(samples = samples.len(), destination = %destination.display(), "Dispatching report export");
    let handle = tokio::task::spawn_blocking(move || {
        let _span = info_span!("background_export", control = %control_name).entered();
        let report = export_report(&samples, &control_name)?;
        writer.write_report(&report, &destination)
    });
    ExportHandle { handle }
}
