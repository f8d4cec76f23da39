//! Primary pass over the contract corpus
//!
//! Contracts are visited in `tx_count`-descending order. Each one ends in
//! exactly one terminal state, and every contract that runs the pipeline gets
//! exactly one committed outcome record, success or failure.

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, warn};

use crate::adapters::{Compiler, SymbolicEstimator};
use crate::config::ProcessingConfig;
use crate::errors::AppResult;
use crate::evaluator::ContractPipeline;
use crate::explorer::{SourceProvider, TransactionSource};
use crate::processor::{ConfigValidator, ProgressReporter, StandardProgressTracker};
use crate::store::OutcomeStore;
use crate::types::contract::{ContractCorpus, ContractRecord};
use crate::types::outcome::{
    ContractState, EvalError, EvalErrorKind, EvalResult, OutcomeRecord, SkipReason,
};
use crate::types::statistics::{PassStats, StatisticsCollector};

/// Terminal state of one contract plus whether its record failed to persist
pub(crate) struct ContractReport {
    pub state: ContractState,
    pub persist_failed: bool,
}

impl ContractReport {
    pub(crate) fn skipped(reason: SkipReason) -> Self {
        Self {
            state: ContractState::Skipped(reason),
            persist_failed: false,
        }
    }

    /// The outcome store could not be used for this contract
    pub(crate) fn store_fault() -> Self {
        Self {
            state: ContractState::Failed(EvalErrorKind::Unexpected),
            persist_failed: true,
        }
    }
}

/// Drives the per-contract pipeline across a corpus
pub struct CorpusOrchestrator<'a, X, C, E> {
    pub(crate) pipeline: &'a ContractPipeline<X, C, E>,
    pub(crate) processing: ProcessingConfig,
}

impl<'a, X, C, E> CorpusOrchestrator<'a, X, C, E>
where
    X: SourceProvider + TransactionSource,
    C: Compiler,
    E: SymbolicEstimator,
{
    pub fn new(
        pipeline: &'a ContractPipeline<X, C, E>,
        processing: ProcessingConfig,
    ) -> AppResult<Self> {
        ConfigValidator::validate_pass_config(
            processing.concurrency,
            processing.progress_interval,
        )?;
        Ok(Self {
            pipeline,
            processing,
        })
    }

    /// Evaluate every eligible, not-yet-processed contract
    pub async fn run_primary(
        &self,
        corpus: &ContractCorpus,
        store: &OutcomeStore,
    ) -> AppResult<PassStats> {
        ConfigValidator::log_config_summary(
            "Primary Pass",
            self.processing.concurrency,
            self.processing.progress_interval,
            Some(&format!(
                "Corpus: {} contracts, results: {}, minimum tx count: {}",
                corpus.len(),
                store.dir().display(),
                self.processing.min_tx_count
            )),
        );
        store.clear_stale_claims()?;

        let reports = stream::iter(corpus.records())
            .map(|record| self.process_contract(record, store))
            .buffer_unordered(self.processing.concurrency);

        let stats = self.drive("Primary Pass", reports, Some(corpus.len())).await?;
        Ok(stats)
    }

    async fn process_contract(
        &self,
        record: &ContractRecord,
        store: &OutcomeStore,
    ) -> ContractReport {
        let address = record.address.as_str();

        match store.exists(address) {
            Ok(true) => return ContractReport::skipped(SkipReason::AlreadyProcessed),
            Ok(false) => {}
            Err(e) => {
                warn!("Cannot process {}: {}", address, e);
                return ContractReport::store_fault();
            }
        }

        if record.tx_count < self.processing.min_tx_count {
            debug!(
                "{}: {} transactions, below minimum {}",
                address, record.tx_count, self.processing.min_tx_count
            );
            return ContractReport::skipped(SkipReason::LowSignal);
        }

        let _claim = match store.try_claim(address) {
            Ok(Some(claim)) => claim,
            Ok(None) => return ContractReport::skipped(SkipReason::AlreadyProcessed),
            Err(e) => {
                error!("Failed to claim {}: {}", address, e);
                return ContractReport::store_fault();
            }
        };
        // Another worker may have committed between the first check and the claim
        if matches!(store.exists(address), Ok(true)) {
            return ContractReport::skipped(SkipReason::AlreadyProcessed);
        }

        info!("Evaluating {} ({}, {} txs)", address, record.name, record.tx_count);
        let result = guarded(self.pipeline.evaluate_contract(record)).await;
        persist(store, address, result)
    }

    /// Consume per-contract reports, keeping statistics and progress output
    pub(crate) async fn drive<S>(
        &self,
        operation: &str,
        reports: S,
        total: Option<usize>,
    ) -> AppResult<PassStats>
    where
        S: futures::Stream<Item = ContractReport>,
    {
        let mut reports = std::pin::pin!(reports);
        let mut stats = PassStats::new();
        let mut tracker = StandardProgressTracker::new();
        tracker.start();

        while let Some(report) = reports.next().await {
            stats.record(&report.state);
            if report.persist_failed {
                stats.persist_failures += 1;
            }

            if stats.contracts_seen % self.processing.progress_interval == 0
                || tracker.should_report()
            {
                ProgressReporter::report_progress_with_metrics(
                    &stats,
                    stats.contracts_seen,
                    total,
                    tracker.elapsed_seconds(),
                )?;
            }
        }

        ProgressReporter::finish_progress_line();
        stats.finish();
        ProgressReporter::report_completion(
            operation,
            stats.contracts_seen,
            stats.evaluated(),
            tracker.elapsed_seconds(),
        );
        info!("  {}", stats.summary());
        for (kind, count) in &stats.failed {
            info!("  {}: {}", kind, count);
        }
        if stats.persist_failures > 0 {
            error!(
                "  {} outcome record(s) could not be written and will be retried next run",
                stats.persist_failures
            );
        }

        Ok(stats)
    }
}

/// Run one contract's pipeline, turning a panic into an `Unexpected` failure
pub(crate) async fn guarded<F>(pipeline: F) -> Result<EvalResult, EvalError>
where
    F: Future<Output = Result<EvalResult, EvalError>>,
{
    match AssertUnwindSafe(pipeline).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            Err(EvalError::Unexpected {
                trace: format!(
                    "panic: {}\n\nBacktrace:\n{}",
                    message,
                    std::backtrace::Backtrace::force_capture()
                ),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Commit the outcome for `address`; a write failure is logged, never propagated
pub(crate) fn persist(
    store: &OutcomeStore,
    address: &str,
    result: Result<EvalResult, EvalError>,
) -> ContractReport {
    let state = match &result {
        Ok(_) => ContractState::Succeeded,
        Err(e) => {
            warn!("{}: {}", address, e);
            ContractState::Failed(e.kind())
        }
    };

    let record = OutcomeRecord::from_result(result);
    let persist_failed = match store.commit(address, &record) {
        Ok(()) => false,
        Err(e) => {
            error!("Failed to persist outcome for {}: {}", address, e);
            true
        }
    };

    ContractReport {
        state,
        persist_failed,
    }
}
