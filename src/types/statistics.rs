//! Statistics collected while driving a pass over the corpus
//!
//! Both the primary pass and the re-evaluation pass share one collector type;
//! it feeds the in-place progress line and the end-of-run summary.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::outcome::{ContractState, EvalErrorKind, SkipReason};
use crate::utils::math::safe_percentage;

/// Common trait for all statistics collectors
pub trait StatisticsCollector {
    /// Get the processing start time
    fn start_time(&self) -> Instant;

    /// Get the total processing duration
    fn duration(&self) -> Duration;

    /// Calculate the processing rate (items per second)
    fn processing_rate(&self) -> f64;

    /// Finalize statistics collection
    fn finish(&mut self);

    /// Get a summary of the statistics
    fn summary(&self) -> String;
}

/// Common timing information for all statistics
#[derive(Debug, Clone)]
pub struct TimingInfo {
    pub start_time: Instant,
    pub processing_duration: Duration,
}

impl Default for TimingInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingInfo {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            processing_duration: Duration::default(),
        }
    }

    pub fn finish(&mut self) {
        self.processing_duration = self.start_time.elapsed();
    }

    pub fn elapsed(&self) -> Duration {
        if self.processing_duration.is_zero() {
            self.start_time.elapsed()
        } else {
            self.processing_duration
        }
    }
}

/// Per-pass tally of terminal contract states
#[derive(Debug, Clone, Default)]
pub struct PassStats {
    pub contracts_seen: usize,
    pub skipped_existing: usize,
    pub skipped_low_signal: usize,
    pub skipped_no_estimate: usize,
    pub succeeded: usize,
    pub failed: BTreeMap<EvalErrorKind, usize>,
    /// Outcome records that could not be written
    pub persist_failures: usize,
    pub timing: TimingInfo,
}

impl PassStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: &ContractState) {
        self.contracts_seen += 1;
        match state {
            ContractState::Skipped(SkipReason::AlreadyProcessed) => self.skipped_existing += 1,
            ContractState::Skipped(SkipReason::LowSignal) => self.skipped_low_signal += 1,
            ContractState::Skipped(SkipReason::NoReusableEstimate) => {
                self.skipped_no_estimate += 1
            }
            ContractState::Succeeded => self.succeeded += 1,
            ContractState::Failed(kind) => *self.failed.entry(*kind).or_insert(0) += 1,
        }
    }

    pub fn failed_total(&self) -> usize {
        self.failed.values().sum()
    }

    /// Contracts that ran the pipeline (succeeded or failed)
    pub fn evaluated(&self) -> usize {
        self.succeeded + self.failed_total()
    }

    pub fn success_rate(&self) -> f64 {
        safe_percentage(self.succeeded, self.evaluated())
    }
}

impl crate::processor::StageMetrics for PassStats {
    fn format_custom_metrics(&self) -> String {
        format!(
            "OK: {} | Failed: {} | Skipped: {} | Success: {:.1}%",
            self.succeeded,
            self.failed_total(),
            self.skipped_existing + self.skipped_low_signal + self.skipped_no_estimate,
            self.success_rate()
        )
    }
}

impl StatisticsCollector for PassStats {
    fn start_time(&self) -> Instant {
        self.timing.start_time
    }

    fn duration(&self) -> Duration {
        self.timing.elapsed()
    }

    fn processing_rate(&self) -> f64 {
        let elapsed = self.timing.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.evaluated() as f64 / elapsed
        } else {
            0.0
        }
    }

    fn finish(&mut self) {
        self.timing.finish();
    }

    fn summary(&self) -> String {
        format!(
            "{} contracts seen, {} evaluated ({} ok, {} failed, {:.1}% success), {} already done, {} low-signal, {:.2} contracts/sec",
            self.contracts_seen,
            self.evaluated(),
            self.succeeded,
            self.failed_total(),
            self.success_rate(),
            self.skipped_existing,
            self.skipped_low_signal,
            self.processing_rate()
        )
    }
}
