//! Masking module
//!
//! Three exclusion layers over the cropped plate image (well disks,
//! overexposure, free-hand paint) and their lazily combined union.

pub mod layers;
pub mod mask_engine;

#[cfg(test)]
mod tests;

pub use layers::BoolMask;
pub use mask_engine::{MaskEngine, MaskedImage};
