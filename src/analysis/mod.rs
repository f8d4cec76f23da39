//! Corpus-wide aggregation of persisted outcome records
//!
//! The [`AggregationEngine`] reads every record of one outcome directory once
//! and exposes the reports as pure folds over that set:
//!
//! - **Accuracy** - contract/function accuracy and coverage overview
//! - **Coverage** - contract accuracy grouped by coverage class
//! - **Gas classes** - class accuracy grouped by gas class
//! - **Errors** - outcome counts per failure kind
//! - **Versions** - outcomes per declared compiler minor version
//!
//! Unreadable records are counted and skipped, never fatal.
//!
//! ## Usage
//!
//! ```no_run
//! use gas_estimate_eval::analysis::{AggregationEngine, OutputFormat, ReportFormatter};
//! use gas_estimate_eval::errors::AppResult;
//! use gas_estimate_eval::store::OutcomeStore;
//!
//! fn example() -> AppResult<()> {
//!     let store = OutcomeStore::open("./eval/contracts".as_ref(), None)?;
//!     let engine = AggregationEngine::from_store(&store)?;
//!     let report = engine.analyse_accuracy();
//!     println!("{}", ReportFormatter::format_accuracy(&report, &OutputFormat::Console)?);
//!     Ok(())
//! }
//! ```

pub mod accuracy_stats;
pub mod outcome_stats;
pub mod reports;
pub mod types;

pub use accuracy_stats::AccuracyStatsAnalyser;
pub use outcome_stats::OutcomeStatsAnalyser;
pub use reports::{OutputFormat, ReportFormatter};
pub use types::{
    AccuracyReport, ClassCount, ClassValueStats, CoverageAccuracyReport, ErrorBreakdownReport,
    GasClassAccuracyReport, OutcomeCategory, RecordCounts, ValueStats, VersionReport, VersionRow,
};

use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::store::{OutcomeStore, ScannedOutcome};
use crate::types::contract::ContractCorpus;
use crate::types::outcome::OutcomeRecord;

/// Parsed outcome records keyed by address
#[derive(Debug, Clone, Default)]
pub struct OutcomeSet {
    pub records: Vec<(String, OutcomeRecord)>,
    pub counts: RecordCounts,
}

impl OutcomeSet {
    pub fn from_scanned(scanned: Vec<ScannedOutcome>) -> Self {
        let mut set = OutcomeSet::default();
        set.counts.total_files = scanned.len();

        for outcome in scanned {
            match outcome.record {
                Ok(record) => {
                    if record.is_success() {
                        set.counts.succeeded += 1;
                    } else {
                        set.counts.failed += 1;
                    }
                    set.records.push((outcome.address, record));
                }
                Err(e) => {
                    debug!("Skipping malformed record {}: {}", outcome.address, e);
                    set.counts.malformed += 1;
                }
            }
        }

        if set.counts.malformed > 0 {
            warn!(
                "Skipped {} malformed outcome record(s)",
                set.counts.malformed
            );
        }
        set
    }
}

/// Main aggregation engine over one outcome directory
pub struct AggregationEngine {
    outcomes: OutcomeSet,
}

impl AggregationEngine {
    /// Scan every record in `store`
    pub fn from_store(store: &OutcomeStore) -> AppResult<Self> {
        Ok(Self::from_outcomes(OutcomeSet::from_scanned(store.scan()?)))
    }

    pub fn from_outcomes(outcomes: OutcomeSet) -> Self {
        Self { outcomes }
    }

    pub fn counts(&self) -> RecordCounts {
        self.outcomes.counts
    }

    /// Contract and function accuracy with coverage overview
    pub fn analyse_accuracy(&self) -> AccuracyReport {
        AccuracyStatsAnalyser::analyse_accuracy(&self.outcomes)
    }

    /// Per-contract accuracy grouped by coverage class
    pub fn analyse_coverage(&self) -> CoverageAccuracyReport {
        AccuracyStatsAnalyser::analyse_coverage(&self.outcomes)
    }

    /// Per-contract class accuracy grouped by gas class
    pub fn analyse_gas_classes(&self) -> GasClassAccuracyReport {
        AccuracyStatsAnalyser::analyse_gas_classes(&self.outcomes)
    }

    /// Success count and failures by kind
    pub fn analyse_errors(&self) -> ErrorBreakdownReport {
        OutcomeStatsAnalyser::analyse_errors(&self.outcomes)
    }

    /// Outcomes grouped by the compiler version declared in the corpus
    pub fn analyse_versions(&self, corpus: &ContractCorpus) -> VersionReport {
        OutcomeStatsAnalyser::analyse_versions(&self.outcomes, corpus)
    }
}
