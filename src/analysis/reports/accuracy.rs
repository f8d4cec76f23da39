//! Accuracy, coverage and gas-class report formatters

use super::utils::{export_json, format_number, format_percent};
use super::OutputFormat;
use crate::analysis::types::{
    AccuracyReport, ClassValueStats, CoverageAccuracyReport, GasClassAccuracyReport, RecordCounts,
};
use crate::errors::AppResult;
use crate::utils::math::safe_percentage;

fn push_record_counts(output: &mut String, records: &RecordCounts) {
    output.push_str(&format!(
        "Records: {} ({} succeeded, {} failed, {} unreadable)\n",
        format_number(records.total_files),
        format_number(records.succeeded),
        format_number(records.failed),
        format_number(records.malformed)
    ));
}

fn push_class_table(output: &mut String, header: &str, classes: &[ClassValueStats]) {
    output.push_str(&format!(
        "{:<16} {:>8} {:>12} {:>12}\n",
        header, "Count", "Mean", "Median"
    ));
    for class in classes {
        output.push_str(&format!(
            "{:<16} {:>8} {:>12} {:>12}\n",
            class.label,
            format_number(class.stats.count),
            format_percent(class.stats.mean),
            format_percent(class.stats.median)
        ));
    }
}

/// Corpus-wide accuracy overview
///
/// Contract accuracy is the mean of each contract's own mean accuracy; the
/// function histogram buckets every evaluated function's mean accuracy.
pub fn format_accuracy(report: &AccuracyReport, format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("\n=== GAS ESTIMATE ACCURACY ===\n\n");
            push_record_counts(&mut output, &report.records);
            output.push_str(&format!(
                "Successful evaluations: {}\n\n",
                format_number(report.contract_accuracy.count)
            ));

            output.push_str("CONTRACT ACCURACY (estimate / actual):\n");
            output.push_str(&format!(
                "  Mean:   {}\n  Median: {}\n\n",
                format_percent(report.contract_accuracy.mean),
                format_percent(report.contract_accuracy.median)
            ));

            output.push_str(&format!(
                "COVERAGE ({} contracts reporting):\n",
                format_number(report.coverage.count)
            ));
            output.push_str(&format!(
                "  Mean:   {}\n  Median: {}\n\n",
                format_percent(report.coverage.mean),
                format_percent(report.coverage.median)
            ));

            output.push_str(&format!(
                "FUNCTION ACCURACY DISTRIBUTION ({} functions):\n",
                format_number(report.functions_total)
            ));
            for bucket in &report.function_accuracy {
                output.push_str(&format!(
                    "  {:<14} {:>8} ({:>5.1}%)\n",
                    bucket.label,
                    format_number(bucket.count),
                    safe_percentage(bucket.count, report.functions_total)
                ));
            }

            Ok(output)
        }
    }
}

pub fn format_coverage(
    report: &CoverageAccuracyReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("\n=== ACCURACY BY COVERAGE ===\n\n");
            push_record_counts(&mut output, &report.records);
            if report.without_coverage > 0 {
                output.push_str(&format!(
                    "Without coverage figure: {}\n",
                    format_number(report.without_coverage)
                ));
            }
            output.push('\n');
            push_class_table(&mut output, "Coverage", &report.classes);
            Ok(output)
        }
    }
}

pub fn format_gas_classes(
    report: &GasClassAccuracyReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Console => {
            let mut output = String::new();
            output.push_str("\n=== ACCURACY BY GAS CLASS ===\n\n");
            push_record_counts(&mut output, &report.records);
            output.push('\n');
            push_class_table(&mut output, "Gas class", &report.classes);
            Ok(output)
        }
    }
}
