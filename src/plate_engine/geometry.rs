//! Plate geometry module
//!
//! Maps the plate rectangle in image coordinates onto the 96 well centers,
//! honoring the plate orientation.

pub mod plate_geometry;

#[cfg(test)]
mod tests;

pub use plate_geometry::{CropRect, PlateDirection, PlateGeometry};
