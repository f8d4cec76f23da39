//! Report types produced by the aggregation engine
//!
//! Accuracy values in reports are percentages (`100.0` = exact estimate).

use serde::{Deserialize, Serialize};

use crate::utils::math::{mean, median};

/// Count, mean and median of a set of values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueStats {
    pub count: usize,
    /// None for an empty set
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

impl ValueStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            median: median(values),
        }
    }
}

/// One class of a classification histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCount {
    pub slot: usize,
    pub label: String,
    pub count: usize,
}

/// Values collected into one class, with their statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassValueStats {
    pub slot: usize,
    pub label: String,
    pub values: Vec<f64>,
    pub stats: ValueStats,
}

/// Records read from the outcome directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordCounts {
    pub total_files: usize,
    /// Unreadable or unparseable files, skipped
    pub malformed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Corpus-wide accuracy overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub records: RecordCounts,
    /// Per-contract mean accuracy (percent)
    pub contract_accuracy: ValueStats,
    /// Per-contract instruction coverage (percent), where reported
    pub coverage: ValueStats,
    /// Per-function mean accuracy bucketed into accuracy classes
    pub function_accuracy: Vec<ClassCount>,
    pub functions_total: usize,
}

/// Per-contract mean accuracy grouped by coverage class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAccuracyReport {
    pub records: RecordCounts,
    pub classes: Vec<ClassValueStats>,
    /// Successful contracts without a coverage figure
    pub without_coverage: usize,
}

/// Per-contract gas-class accuracy grouped by gas class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasClassAccuracyReport {
    pub records: RecordCounts,
    pub classes: Vec<ClassValueStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCategory {
    pub category: String,
    pub description: String,
    pub count: usize,
    pub percentage: f64,
}

/// Outcome counts: successes plus one row per failure kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBreakdownReport {
    pub records: RecordCounts,
    pub categories: Vec<OutcomeCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRow {
    /// `0.<minor>.x`, or `unknown`
    pub version: String,
    pub evaluated: usize,
    pub succeeded: usize,
}

/// Outcomes grouped by declared compiler minor version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionReport {
    pub records: RecordCounts,
    pub versions: Vec<VersionRow>,
}
