//! Error and compiler-version breakdown formatters

use super::utils::{export_json, format_number};
use super::OutputFormat;
use crate::analysis::types::{ErrorBreakdownReport, VersionReport};
use crate::errors::AppResult;
use crate::utils::math::safe_percentage;

pub fn format_errors(report: &ErrorBreakdownReport, format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("\n=== OUTCOMES BY CATEGORY ===\n\n");
            for category in &report.categories {
                output.push_str(&format!(
                    "{:<48} {:>8} ({:>5.1}%)\n",
                    category.description,
                    format_number(category.count),
                    category.percentage
                ));
            }
            if report.records.malformed > 0 {
                output.push_str(&format!(
                    "\nUnreadable records skipped: {}\n",
                    format_number(report.records.malformed)
                ));
            }
            Ok(output)
        }
    }
}

pub fn format_versions(report: &VersionReport, format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("\n=== OUTCOMES BY COMPILER VERSION ===\n\n");
            output.push_str(&format!(
                "{:<10} {:>10} {:>10} {:>9}\n",
                "Version", "Evaluated", "Succeeded", "Rate"
            ));
            for row in &report.versions {
                output.push_str(&format!(
                    "{:<10} {:>10} {:>10} {:>8.1}%\n",
                    row.version,
                    format_number(row.evaluated),
                    format_number(row.succeeded),
                    safe_percentage(row.succeeded, row.evaluated)
                ));
            }
            Ok(output)
        }
    }
}
