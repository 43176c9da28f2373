//! Color representation and conversion module
//!
//! Per-well color values and the sRGB <-> CIE L*a*b* / xyY transforms. The
//! reference white is D65 with the 2 degree observer and sRGB companding
//! applied to the normalized 0..1 channels.

pub mod types;
pub mod space;


pub use types::{ColorSpace, LabColor, RgbColor, XyyColor, euclidean};
pub use space::{
    lab_grid, lab_to_rgb, rgb_grid_from_lab, rgb_to_lab, rgb_to_xyy, space_channels, xyy_grid,
};
