//! Report formatting and output generation
//!
//! Provides formatting for aggregation results via the [`ReportFormatter`] facade.
//! Supports Console and JSON output formats.

pub mod accuracy;
pub mod breakdown;
pub mod utils;

use std::str::FromStr;

use crate::errors::{AppError, AppResult};
use crate::analysis::types::{
    AccuracyReport, CoverageAccuracyReport, ErrorBreakdownReport, GasClassAccuracyReport,
    VersionReport,
};

/// Output format options for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown output format '{}': expected console or json",
                other
            ))),
        }
    }
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_number(n: usize) -> String {
        utils::format_number(n)
    }

    pub fn format_accuracy(r: &AccuracyReport, f: &OutputFormat) -> AppResult<String> {
        accuracy::format_accuracy(r, f)
    }
    pub fn format_coverage(r: &CoverageAccuracyReport, f: &OutputFormat) -> AppResult<String> {
        accuracy::format_coverage(r, f)
    }
    pub fn format_gas_classes(r: &GasClassAccuracyReport, f: &OutputFormat) -> AppResult<String> {
        accuracy::format_gas_classes(r, f)
    }

    pub fn format_errors(r: &ErrorBreakdownReport, f: &OutputFormat) -> AppResult<String> {
        breakdown::format_errors(r, f)
    }
    pub fn format_versions(r: &VersionReport, f: &OutputFormat) -> AppResult<String> {
        breakdown::format_versions(r, f)
    }
}
