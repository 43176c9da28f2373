use std::path::PathBuf;

use anyhow::{Context, bail};
use plate_colorimetry_rs::logger;
use plate_colorimetry_rs::plate_engine::{
    CameraSettings, CaptureSchedule, CaptureSession, CsvTimelineStore, EngineConfig,
    ImageSequenceSource, NamedSample, PlateDirection, PlateGeometry, SnapshotBundle, Timeline,
    WellColorExtractor, XlsxReportWriter, export_in_background,
};

use tracing::{error, info};

/// Seconds between replayed frames.
const REPLAY_INTERVAL_SECS: i64 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    let mut args = std::env::args().skip(1);
    let Some(output_dir) = args.next().map(PathBuf::from) else {
        bail!("usage: plate_colorimetry_rs <output-dir> <frame.png> <frame.png>...");
    };
    let frames: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if frames.len() < 2 {
        bail!("at least a baseline and one follow-up frame are required");
    }

    info!("Starting plate_colorimetry...");

    let config = match std::env::var("PLATE_CONFIG") {
        Ok(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading config {}", path))?,
        Err(_) => EngineConfig::default(),
    };
    info!("Radius: {} px, flare threshold: {}", config.radius, config.flare_threshold);

    let baseline = image::open(&frames[0])
        .with_context(|| format!("reading {}", frames[0].display()))?
        .into_rgb8();
    let (width, height) = baseline.dimensions();
    let geometry = if height > width {
        PlateGeometry::new(0, 0, height, width, PlateDirection::Vertical)
    } else {
        PlateGeometry::new(0, 0, width, height, PlateDirection::Horizontal)
    };
    let mut extractor = WellColorExtractor::new(baseline, geometry, config.clone())?;
    let control = NamedSample::new("baseline", extractor.mean_colors()?.clone());

    let schedule = CaptureSchedule::from_pairs(&[(REPLAY_INTERVAL_SECS, frames.len() as i64 - 1)])?;
    let store = CsvTimelineStore::new(&output_dir, "timeline");
    let timeline = Timeline::with_store(schedule, store, CameraSettings::default())?
        .with_velocity_epsilon(config.velocity_epsilon);

    let mut session = CaptureSession::new(ImageSequenceSource::new(frames), extractor, timeline)
        .with_baseline_calibration(true);
    let summary = session.run().await?;
    info!(
        "Captured {} frames in {}s (complete: {})",
        summary.captured,
        summary.elapsed.as_secs(),
        summary.completed
    );

    let (_, mut extractor, timeline) = session.into_parts();
    let bundle = SnapshotBundle::capture(&mut extractor)?;
    let paths = bundle.save(&output_dir, "final", config.mask_compression)?;
    info!("Final snapshot saved to {}", paths.image.display());

    let samples = vec![control, NamedSample::new("final", extractor.mean_colors()?.clone())];
    let export = export_in_background(
        XlsxReportWriter,
        samples,
        "baseline".to_string(),
        output_dir.join("report.xlsx"),
    );
    match export.wait().await {
        Ok(files) => info!("Report written to {}", files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>().join(", ")),
        Err(e) => error!("Report export failed: {}", e),
    }

    info!("Timeline rows: {} / {}", timeline.current_count(), timeline.end_count());
    Ok(())
}
