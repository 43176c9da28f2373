//! Plate rectangle and well-center layout.
//!
//! The stored `width` always spans the plate's 12-well axis and `height` its
//! 8-well axis, whatever the orientation. With [`PlateDirection::Vertical`]
//! the plate sits rotated in the image, so the image-space crop swaps the two
//! extents and logical well row `r` runs along the image x axis while logical
//! column `c` runs along the image y axis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::{WELL_COLUMNS, WELL_ROWS, WellGrid, WellIndex};

/// Plate orientation in the camera image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlateDirection {
    /// 12 columns across the image, 8 rows down.
    #[default]
    Horizontal,
    /// 8 columns across the image, 12 rows down.
    Vertical,
}

impl PlateDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl TryFrom<u8> for PlateDirection {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Horizontal),
            1 => Ok(Self::Vertical),
            other => Err(EngineError::Validation(format!(
                "plate direction must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl From<PlateDirection> for u8 {
    fn from(direction: PlateDirection) -> Self {
        match direction {
            PlateDirection::Horizontal => 0,
            PlateDirection::Vertical => 1,
        }
    }
}

/// Image-space rectangle covering the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Plate region plus orientation. Axis centers are always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateGeometry {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    direction: PlateDirection,
}

impl PlateGeometry {
    pub fn new(x: u32, y: u32, width: u32, height: u32, direction: PlateDirection) -> Self {
        Self {
            x,
            y,
            width,
            height,
            direction,
        }
    }

    /// Sets the plate rectangle; the orientation is left alone.
    pub fn set_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        debug!(x, y, width, height, "Plate region updated");
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
    }

    /// Sets the orientation from its persisted code. Anything but 0 or 1 is
    /// rejected and leaves the geometry untouched.
    pub fn set_direction(&mut self, direction: u8) -> Result<()> {
        self.set_orientation(PlateDirection::try_from(direction)?);
        Ok(())
    }

    pub fn set_orientation(&mut self, direction: PlateDirection) {
        debug!(?direction, "Plate orientation updated");
        self.direction = direction;
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
    }

    pub fn direction(&self) -> PlateDirection {
        self.direction
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Same plate size and orientation anchored at a new origin.
    pub fn relocated(&self, x: u32, y: u32) -> Self {
        Self { x, y, ..*self }
    }

    pub fn crop_rect(&self) -> CropRect {
        let (width, height) = match self.direction {
            PlateDirection::Horizontal => (self.width, self.height),
            PlateDirection::Vertical => (self.height, self.width),
        };
        CropRect {
            x: self.x,
            y: self.y,
            width,
            height,
        }
    }

    /// Centers along the image y axis of the cropped plate.
    pub fn row_axes(&self) -> Vec<f64> {
        let count = match self.direction {
            PlateDirection::Horizontal => WELL_ROWS,
            PlateDirection::Vertical => WELL_COLUMNS,
        };
        axis_centers(self.crop_rect().height, count)
    }

    /// Centers along the image x axis of the cropped plate.
    pub fn column_axes(&self) -> Vec<f64> {
        let count = match self.direction {
            PlateDirection::Horizontal => WELL_COLUMNS,
            PlateDirection::Vertical => WELL_ROWS,
        };
        axis_centers(self.crop_rect().width, count)
    }

    /// `(x, y)` of every well, relative to the crop origin.
    pub fn well_centers(&self) -> WellGrid<(f64, f64)> {
        let rows = self.row_axes();
        let columns = self.column_axes();
        WellGrid::from_fn(|well: WellIndex| match self.direction {
            PlateDirection::Horizontal => (columns[well.column()], rows[well.row()]),
            PlateDirection::Vertical => (columns[well.row()], rows[well.column()]),
        })
    }
}

fn axis_centers(extent: u32, count: usize) -> Vec<f64> {
    let interval = extent as f64 / count as f64;
    (0..count)
        .map(|i| interval / 2.0 + i as f64 * interval)
        .collect()
}
