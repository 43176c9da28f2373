use std::path::PathBuf;

use image::RgbImage;
use tracing::debug;

use crate::plate_engine::common::error::{EngineError, Result};

/// Camera collaborator: yields one full frame per call.
pub trait FrameSource {
    fn capture_frame(&mut self) -> Result<RgbImage>;
}

/// Replays image files in order, one per capture.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, next: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.paths.len() - self.next
    }
}

impl FrameSource for ImageSequenceSource {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        let path = self.paths.get(self.next).ok_or_else(|| {
            EngineError::NotFound(format!("frame {} of a {}-frame sequence", self.next, self.paths.len()))
        })?;
        let frame = image::open(path)?.into_rgb8();
        debug!(path = %path.display(), width = frame.width(), height = frame.height(), "Frame loaded");
        self.next += 1;
        Ok(frame)
    }
}
