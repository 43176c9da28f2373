//! Common utilities module
//!
//! Shared error type and the fixed 8x12 well grid used by every component.

pub mod error;
pub mod grid;

#[cfg(test)]
mod tests;

pub use error::{EngineError, Result};
pub use grid::{WELL_COLUMNS, WELL_COUNT, WELL_ROWS, WellGrid, WellIndex};
