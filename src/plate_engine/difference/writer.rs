use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::{debug, info, instrument};

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::difference::report::{Report, ReportSheet};

pub trait ReportWriter {
    /// Writes every sheet of `report` under `destination`, returning the
    /// files created.
    fn write_report(&self, report: &Report, destination: &Path) -> Result<Vec<PathBuf>>;
}

/// Single `.xlsx` workbook, one worksheet per sheet. `destination` is the
/// workbook file.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReportWriter;

impl XlsxReportWriter {
    fn encode(report: &Report) -> std::result::Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        for sheet in &report.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;
            worksheet.write_string_with_format(0, 0, "well", &header_format)?;
            for (col, name) in sheet.columns.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16 + 1, name.as_str(), &header_format)?;
            }
            for (row_index, row) in sheet.rows.iter().enumerate() {
                let xlsx_row = row_index as u32 + 1;
                worksheet.write_string(xlsx_row, 0, row.label.as_str())?;
                for (col, value) in row.values.iter().enumerate() {
                    worksheet.write_number(xlsx_row, col as u16 + 1, *value)?;
                }
            }
            debug!(sheet = %sheet.name, rows = sheet.rows.len(), "Worksheet encoded");
        }
        Ok(workbook)
    }
}

impl ReportWriter for XlsxReportWriter {
    #[instrument(skip(self, report), fields(sheets = report.sheets.len()))]
    fn write_report(&self, report: &Report, destination: &Path) -> Result<Vec<PathBuf>> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut workbook = Self::encode(report).map_err(|e| EngineError::EncodeError(e.to_string()))?;
        workbook
            .save(destination)
            .map_err(|e| EngineError::EncodeError(format!("{}: {}", destination.display(), e)))?;
        info!(
            workbook = %destination.display(),
            sheets = report.sheets.len(),
            "Report exported"
        );
        Ok(vec![destination.to_path_buf()])
    }
}

/// Directory holding one CSV file per sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    /// File name of a sheet: lowercase, spaces replaced by underscores.
    pub fn sheet_file_name(sheet_name: &str) -> String {
        let stem: String = sheet_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        format!("{}.csv", stem)
    }

    pub fn write_sheet(&self, sheet: &ReportSheet, output: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(output);
        let mut header = Vec::with_capacity(1 + sheet.columns.len());
        header.push("well");
        header.extend(sheet.columns.iter().map(String::as_str));
        writer.write_record(&header)?;
        for row in &sheet.rows {
            let mut record = Vec::with_capacity(1 + row.values.len());
            record.push(row.label.clone());
            record.extend(row.values.iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportWriter for CsvReportWriter {
    #[instrument(skip(self, report), fields(sheets = report.sheets.len()))]
    fn write_report(&self, report: &Report, destination: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(destination)?;
        let mut written = Vec::with_capacity(report.sheets.len());
        for sheet in &report.sheets {
            let path = destination.join(Self::sheet_file_name(&sheet.name));
            let mut file = std::fs::File::create(&path)?;
            self.write_sheet(sheet, &mut file)?;
            debug!(sheet = %sheet.name, path = %path.display(), "Sheet written");
            written.push(path);
        }
        info!(
            destination = %destination.display(),
            files = written.len(),
            "Report exported"
        );
        Ok(written)
    }
}
