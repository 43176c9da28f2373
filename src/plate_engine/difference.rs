//! Color difference module
//!
//! Stateless comparison of well color samples against a control sample, and
//! the tabular report built from those comparisons.

pub mod calculator;
pub mod report;
pub mod writer;


pub use calculator::{ColorDistanceResult, color_distance};
pub use report::{NamedSample, Report, ReportRow, ReportSheet, export_report};
pub use writer::{CsvReportWriter, ReportWriter, XlsxReportWriter};
