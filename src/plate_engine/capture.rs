//! Capture driver module
//!
//! Runs a timeline against a frame source on the tokio timer, one capture per
//! scheduled interval, and offloads report export to the blocking pool.

pub mod export;
pub mod session;
pub mod source;


pub use export::{ExportHandle, export_in_background};
pub use session::{CaptureSession, CaptureSummary};
pub use source::{FrameSource, ImageSequenceSource};
