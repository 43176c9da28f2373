//! Fixed-size well grid types.
//!
//! Every per-well quantity in the engine lives in a [`WellGrid`]: 8 rows
//! (letters A-H) by 12 columns (numbers 1-12), stored row-major.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::plate_engine::common::error::{EngineError, Result};

/// Number of well rows on the plate (A-H).
pub const WELL_ROWS: usize = 8;
/// Number of well columns on the plate (1-12).
pub const WELL_COLUMNS: usize = 12;
/// Total wells on the plate.
pub const WELL_COUNT: usize = WELL_ROWS * WELL_COLUMNS;

/// Position of a single well in the logical plate grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWellIndex")]
pub struct WellIndex {
    row: usize,
    column: usize,
}

#[derive(Deserialize)]
struct RawWellIndex {
    row: usize,
    column: usize,
}

impl TryFrom<RawWellIndex> for WellIndex {
    type Error = EngineError;

    fn try_from(raw: RawWellIndex) -> Result<Self> {
        Self::new(raw.row, raw.column)
    }
}

impl WellIndex {
    /// Creates a well index, failing with `NotFound` outside the 8x12 grid.
    pub fn new(row: usize, column: usize) -> Result<Self> {
        if row >= WELL_ROWS || column >= WELL_COLUMNS {
            return Err(EngineError::NotFound(format!(
                "well (row={}, column={}) is outside the {}x{} plate",
                row, column, WELL_ROWS, WELL_COLUMNS
            )));
        }
        Ok(Self { row, column })
    }

    /// Row-major flat offset into a [`WellGrid`].
    pub fn from_offset(offset: usize) -> Result<Self> {
        Self::new(offset / WELL_COLUMNS, offset % WELL_COLUMNS)
            .map_err(|_| EngineError::NotFound(format!("well offset {} out of range", offset)))
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn offset(&self) -> usize {
        self.row * WELL_COLUMNS + self.column
    }

    /// Report label: column number then row letter, e.g. `1-A`, `12-H`.
    ///
    /// The row-number/column-letter form (`8-L` for the last well) is
    /// deliberately not used; the letter always names one of the rows `A`..`H`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.column + 1, (b'A' + self.row as u8) as char)
    }

    /// Iterates every well in row-major order.
    pub fn all() -> impl Iterator<Item = WellIndex> {
        (0..WELL_COUNT).map(|offset| WellIndex {
            row: offset / WELL_COLUMNS,
            column: offset % WELL_COLUMNS,
        })
    }
}

impl fmt::Display for WellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// 96 values, one per well, in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct WellGrid<T> {
    cells: Vec<T>,
}

impl<T> WellGrid<T> {
    /// Builds a grid by evaluating `f` for every well.
    pub fn from_fn(mut f: impl FnMut(WellIndex) -> T) -> Self {
        Self {
            cells: WellIndex::all().map(&mut f).collect(),
        }
    }

    /// Wraps a flat row-major vector, which must hold exactly 96 values.
    pub fn from_vec(cells: Vec<T>) -> Result<Self> {
        if cells.len() != WELL_COUNT {
            return Err(EngineError::Validation(format!(
                "well grid needs {} values, got {}",
                WELL_COUNT,
                cells.len()
            )));
        }
        Ok(Self { cells })
    }

    pub fn get(&self, well: WellIndex) -> &T {
        &self.cells[well.offset()]
    }

    pub fn get_mut(&mut self, well: WellIndex) -> &mut T {
        &mut self.cells[well.offset()]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Iterates `(well, value)` pairs in row-major order.
    pub fn iter_wells(&self) -> impl Iterator<Item = (WellIndex, &T)> {
        WellIndex::all().zip(self.cells.iter())
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> WellGrid<U> {
        WellGrid {
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Combines two grids cell by cell.
    pub fn zip_map<U, V>(&self, other: &WellGrid<U>, mut f: impl FnMut(&T, &U) -> V) -> WellGrid<V> {
        WellGrid {
            cells: self
                .cells
                .iter()
                .zip(other.cells.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }
}

impl<T: Clone> WellGrid<T> {
    pub fn filled(value: T) -> Self {
        Self {
            cells: vec![value; WELL_COUNT],
        }
    }
}

impl<T: Serialize> Serialize for WellGrid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.chunks(WELL_COLUMNS))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WellGrid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        if rows.len() != WELL_ROWS || rows.iter().any(|row| row.len() != WELL_COLUMNS) {
            return Err(D::Error::custom(format!(
                "expected a {}x{} well grid",
                WELL_ROWS, WELL_COLUMNS
            )));
        }
        Ok(Self {
            cells: rows.into_iter().flatten().collect(),
        })
    }
}
