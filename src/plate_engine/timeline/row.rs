//! Timeline row types and their fixed tabular layout.

use csv::StringRecord;

use crate::plate_engine::color::types::RgbColor;
use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::{WELL_COUNT, WellGrid, WellIndex};

/// Columns per metric block: R, G, B, distance, velocity for every well.
const BLOCK_COLUMNS: usize = WELL_COUNT * 5;

/// Colors and derived metrics of one row, for either raw or corrected colors.
#[derive(Debug, Clone, PartialEq)]
pub struct WellMetrics {
    pub rgb: WellGrid<RgbColor>,
    /// Euclidean RGB distance from the baseline row
    pub distance: WellGrid<f64>,
    /// Relative change of `distance` against the previous row
    pub velocity: WellGrid<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub index: usize,
    pub elapsed_seconds: u64,
    pub raw: WellMetrics,
    pub corrected: Option<WellMetrics>,
}

impl TimelineRow {
    /// Header in persisted column order.
    pub fn csv_header() -> Vec<String> {
        let mut header = Vec::with_capacity(1 + 2 * BLOCK_COLUMNS);
        header.push("elapsed_time".to_string());
        for prefix in ["", "corrected_"] {
            for channel in ["R", "G", "B"] {
                header.extend(WellIndex::all().map(|well| format!("{}_{}{}", well, prefix, channel)));
            }
            header.extend(WellIndex::all().map(|well| format!("{}_{}distance", well, prefix)));
            header.extend(WellIndex::all().map(|well| format!("{}_{}velocity", well, prefix)));
        }
        header
    }

    /// Values in header order; corrected columns are blank when absent.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(1 + 2 * BLOCK_COLUMNS);
        record.push(self.elapsed_seconds.to_string());
        push_block(&mut record, Some(&self.raw));
        push_block(&mut record, self.corrected.as_ref());
        record
    }

    pub fn from_record(index: usize, record: &StringRecord) -> Result<Self> {
        if record.len() != 1 + 2 * BLOCK_COLUMNS {
            return Err(EngineError::DecodeError(format!(
                "timeline row {} has {} columns, expected {}",
                index,
                record.len(),
                1 + 2 * BLOCK_COLUMNS
            )));
        }
        let elapsed_seconds = record[0].parse::<u64>().map_err(|e| {
            EngineError::DecodeError(format!("timeline row {} elapsed_time: {}", index, e))
        })?;
        let fields: Vec<&str> = record.iter().collect();
        let raw = parse_block(index, &fields[1..1 + BLOCK_COLUMNS])?.ok_or_else(|| {
            EngineError::DecodeError(format!("timeline row {} has no raw colors", index))
        })?;
        let corrected = parse_block(index, &fields[1 + BLOCK_COLUMNS..])?;
        Ok(Self {
            index,
            elapsed_seconds,
            raw,
            corrected,
        })
    }
}

fn push_block(record: &mut Vec<String>, metrics: Option<&WellMetrics>) {
    match metrics {
        Some(m) => {
            record.extend(m.rgb.iter().map(|c| c.r.to_string()));
            record.extend(m.rgb.iter().map(|c| c.g.to_string()));
            record.extend(m.rgb.iter().map(|c| c.b.to_string()));
            record.extend(m.distance.iter().map(f64::to_string));
            record.extend(m.velocity.iter().map(f64::to_string));
        }
        None => record.extend(std::iter::repeat_n(String::new(), BLOCK_COLUMNS)),
    }
}

fn parse_block(index: usize, fields: &[&str]) -> Result<Option<WellMetrics>> {
    if fields.iter().all(|f| f.is_empty()) {
        return Ok(None);
    }
    let values = fields
        .iter()
        .map(|f| {
            f.parse::<f64>().map_err(|e| {
                EngineError::DecodeError(format!("timeline row {} value {:?}: {}", index, f, e))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    let column = |block: usize| values[block * WELL_COUNT..(block + 1) * WELL_COUNT].to_vec();
    let (r, g, b) = (column(0), column(1), column(2));
    let rgb = WellGrid::from_fn(|well| {
        let i = well.offset();
        RgbColor::new(r[i], g[i], b[i])
    });
    Ok(Some(WellMetrics {
        rgb,
        distance: WellGrid::from_vec(column(3))?,
        velocity: WellGrid::from_vec(column(4))?,
    }))
}
