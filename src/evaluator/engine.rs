//! Accuracy evaluation engine
//!
//! Replays a contract's concrete transactions (newest first) against the
//! estimator's per-function gas estimates. Each matched transaction yields one
//! accuracy sample `estimate / gasUsed`, recorded against its function, the
//! overall set and one gas class.
//!
//! Pagination continues while fewer than `max_pages` pages have been fetched
//! or fewer than `min_samples` samples were collected, and stops as soon as the
//! feed is exhausted or `page_hard_limit` pages were read.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::EvaluationConfig;
use crate::explorer::{ConcreteTransaction, TransactionPage, TransactionSource};
use crate::types::accuracy::{
    is_valid_selector, selector_prefix, AccuracySummary, FunctionGasEstimate, SymExecOutput,
};
use crate::types::classification::{ClassBuckets, GasClassBasis};
use crate::types::outcome::{EvalError, EvalResult};

/// Samples collected for one contract
#[derive(Debug)]
pub struct SampleAccumulator {
    estimates: FunctionGasEstimate,
    per_function_cap: usize,
    basis: GasClassBasis,
    buckets: ClassBuckets,
    functions: BTreeMap<String, Vec<f64>>,
    overall: Vec<f64>,
    gas_classes: Vec<Vec<f64>>,
}

impl SampleAccumulator {
    pub fn new(
        estimates: FunctionGasEstimate,
        per_function_cap: usize,
        basis: GasClassBasis,
    ) -> Self {
        // Entries such as "fallback" or "constructor" can never match calldata
        let estimates: FunctionGasEstimate = estimates
            .into_iter()
            .filter(|(selector, _)| is_valid_selector(selector))
            .collect();
        let buckets = ClassBuckets::gas();
        let functions = estimates.keys().map(|k| (k.clone(), Vec::new())).collect();
        Self {
            estimates,
            per_function_cap,
            basis,
            gas_classes: buckets.empty_slots(),
            buckets,
            functions,
            overall: Vec::new(),
        }
    }

    /// Record a transaction; returns whether it produced a sample
    pub fn observe(&mut self, tx: &ConcreteTransaction) -> bool {
        let selector = selector_prefix(&tx.input);
        let Some(&estimate) = self.estimates.get(selector) else {
            return false;
        };
        if tx.gas_used == 0 {
            return false;
        }
        let Some(samples) = self.functions.get_mut(selector) else {
            return false;
        };
        if samples.len() >= self.per_function_cap {
            return false;
        }

        let accuracy = estimate as f64 / tx.gas_used as f64;
        samples.push(accuracy);
        self.overall.push(accuracy);

        let class_value = self.basis.pick(tx.gas_used, estimate) as f64;
        let slot = self.buckets.index_of(class_value);
        self.gas_classes[slot].push(accuracy);
        true
    }

    pub fn sample_count(&self) -> usize {
        self.overall.len()
    }

    /// Summaries for the overall set, every observed function and every non-empty gas class
    pub fn finish(self, symexec_result: SymExecOutput) -> Result<EvalResult, EvalError> {
        let summary =
            AccuracySummary::from_samples(&self.overall).ok_or(EvalError::NoMatchingTransactions)?;

        let functions = self
            .functions
            .iter()
            .filter_map(|(selector, samples)| {
                AccuracySummary::from_samples(samples).map(|s| (selector.clone(), s))
            })
            .collect();

        let gas_class = self
            .gas_classes
            .iter()
            .enumerate()
            .filter_map(|(slot, samples)| AccuracySummary::from_samples(samples).map(|s| (slot, s)))
            .collect();

        Ok(EvalResult {
            summary,
            functions,
            gas_class,
            symexec_result,
        })
    }
}

/// Evaluation budget and classification policy
#[derive(Debug, Clone)]
pub struct AccuracyEvaluator {
    config: EvaluationConfig,
}

impl AccuracyEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Evaluate one contract's estimates against its transaction feed
    ///
    /// Feed errors are contract-level failures and come back as
    /// [`EvalError::Unexpected`].
    pub async fn evaluate<T>(
        &self,
        feed: &T,
        address: &str,
        symexec_result: SymExecOutput,
    ) -> Result<EvalResult, EvalError>
    where
        T: TransactionSource,
    {
        let mut samples = SampleAccumulator::new(
            symexec_result.normalised_estimates(),
            self.config.max_samples_per_function,
            self.config.gas_class_basis,
        );

        let mut pages_fetched: u32 = 0;
        while (pages_fetched < self.config.max_pages
            || samples.sample_count() < self.config.min_samples)
            && pages_fetched < self.config.page_hard_limit
        {
            let page = feed
                .list_transactions(address, pages_fetched + 1, self.config.page_size)
                .await
                .map_err(EvalError::unexpected)?;
            pages_fetched += 1;

            match page {
                TransactionPage::Exhausted => break,
                TransactionPage::Transactions(transactions) => {
                    for tx in &transactions {
                        samples.observe(tx);
                    }
                }
            }
        }

        debug!(
            "{}: {} samples from {} page(s)",
            address,
            samples.sample_count(),
            pages_fetched
        );

        samples.finish(symexec_result)
    }
}
