//! Difference report: one sheet of raw values plus one distance sheet per
//! color space, every sheet with one row per well.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::plate_engine::color::types::ColorSpace;
use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::WellIndex;
use crate::plate_engine::difference::calculator::{ColorDistanceResult, color_distance};
use crate::plate_engine::snapshot::WellColorSample;

pub const RGB_VALUES_SHEET: &str = "RGB values";

/// A sample tagged with the name it is reported under (target or control).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSample {
    pub name: String,
    pub colors: WellColorSample,
}

impl NamedSample {
    pub fn new(name: impl Into<String>, colors: WellColorSample) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub name: String,
    /// Value column names; the well label column is implicit
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportSheet {
    fn new(name: String, columns: Vec<String>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&self, well: WellIndex) -> &ReportRow {
        &self.rows[well.offset()]
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| EngineError::NotFound(format!("column {:?} in sheet {:?}", column, self.name)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub control: String,
    pub sheets: Vec<ReportSheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Result<&ReportSheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| EngineError::NotFound(format!("report sheet {:?}", name)))
    }
}

pub fn difference_sheet_name(space: ColorSpace) -> String {
    format!("{} difference", space.as_str())
}

/// Builds the report comparing every sample except the control against the
/// control. Fails with `NotFound` when no sample carries `control_name`.
#[instrument(skip(samples), fields(samples = samples.len()))]
pub fn export_report(samples: &[NamedSample], control_name: &str) -> Result<Report> {
    let control = samples
        .iter()
        .find(|sample| sample.name == control_name)
        .ok_or_else(|| EngineError::NotFound(format!("control sample {:?}", control_name)))?;
    let targets: Vec<&NamedSample> = samples
        .iter()
        .filter(|sample| sample.name != control_name)
        .collect();

    let mut sheets = Vec::with_capacity(1 + ColorSpace::ALL.len());
    sheets.push(values_sheet(samples));
    for space in ColorSpace::ALL {
        let results: Vec<ColorDistanceResult> = targets
            .iter()
            .map(|target| color_distance(&target.colors, &control.colors, space))
            .collect();
        let columns = targets.iter().map(|t| t.name.clone()).collect();
        let mut sheet = ReportSheet::new(difference_sheet_name(space), columns);
        sheet.rows = WellIndex::all()
            .map(|well| ReportRow {
                label: well.label(),
                values: results.iter().map(|r| *r.distances.get(well)).collect(),
            })
            .collect();
        sheets.push(sheet);
    }

    info!(
        control = control_name,
        targets = targets.len(),
        sheets = sheets.len(),
        "Difference report built"
    );
    Ok(Report {
        control: control_name.to_string(),
        sheets,
    })
}

fn values_sheet(samples: &[NamedSample]) -> ReportSheet {
    let columns = samples
        .iter()
        .flat_map(|s| ["R", "G", "B"].map(|channel| format!("{}_{}", s.name, channel)))
        .collect();
    let mut sheet = ReportSheet::new(RGB_VALUES_SHEET.to_string(), columns);
    sheet.rows = WellIndex::all()
        .map(|well| ReportRow {
            label: well.label(),
            values: samples
                .iter()
                .flat_map(|s| s.colors.get(well).channels())
                .collect(),
        })
        .collect();
    sheet
}
