//! Plate color-quantification engine
//!
//! Geometry, masking and per-well color extraction for 96-well sensor plates,
//! with a schedule-driven timeline of color changes, reference-based Lab
//! correction and target/control difference reports.

pub mod common;
pub mod config;
pub mod geometry;
pub mod color;
pub mod mask;
pub mod snapshot;
pub mod timeline;
pub mod difference;
pub mod persistence;
pub mod capture;

pub use common::{
    EngineError,
    Result,
    WellGrid,
    WellIndex,
};

pub use config::{
    CameraSettings,
    EngineConfig,
    EngineConfigBuilder,
    MaskCompression,
};

pub use geometry::{
    CropRect,
    PlateDirection,
    PlateGeometry,
};

pub use color::{
    ColorSpace,
    LabColor,
    RgbColor,
    XyyColor,
};

pub use mask::{
    BoolMask,
    MaskEngine,
    MaskedImage,
};

pub use snapshot::{
    ColorCorrectionFactors,
    CorrectionFactor,
    ReferenceMode,
    WellColorExtractor,
    WellColorSample,
};

pub use timeline::{
    CaptureRound,
    CaptureSchedule,
    CsvTimelineStore,
    NullStore,
    Timeline,
    TimelineRow,
    TimelineStore,
};

pub use difference::{
    ColorDistanceResult,
    CsvReportWriter,
    NamedSample,
    Report,
    ReportWriter,
    XlsxReportWriter,
    color_distance,
    export_report,
};

pub use persistence::{
    MaskCodec,
    SnapshotBundle,
    TiffMaskCodec,
};

pub use capture::{
    CaptureSession,
    CaptureSummary,
    FrameSource,
    ImageSequenceSource,
    export_in_background,
};
