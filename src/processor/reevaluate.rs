//! Re-evaluation pass
//!
//! Revisits the failed records of a secondary pass directory. When the primary
//! directory holds a successful record for the same address, only the
//! accuracy evaluation is re-run, using the estimator output embedded in that
//! record; compilation and symbolic execution are never repeated.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use super::corpus::{guarded, persist, ContractReport, CorpusOrchestrator};
use crate::adapters::{Compiler, SymbolicEstimator};
use crate::errors::AppResult;
use crate::explorer::{SourceProvider, TransactionSource};
use crate::processor::ConfigValidator;
use crate::store::OutcomeStore;
use crate::types::outcome::SkipReason;
use crate::types::statistics::PassStats;

impl<'a, X, C, E> CorpusOrchestrator<'a, X, C, E>
where
    X: SourceProvider + TransactionSource,
    C: Compiler,
    E: SymbolicEstimator,
{
    /// Re-run evaluation for every failed record in `secondary`
    pub async fn run_reevaluation(
        &self,
        primary: &OutcomeStore,
        secondary: &OutcomeStore,
    ) -> AppResult<PassStats> {
        ConfigValidator::log_config_summary(
            "Re-evaluation Pass",
            self.processing.concurrency,
            self.processing.progress_interval,
            Some(&format!(
                "Primary: {}, secondary: {}",
                primary.dir().display(),
                secondary.dir().display()
            )),
        );
        secondary.clear_stale_claims()?;

        let mut failed = Vec::new();
        let mut already_ok = 0usize;
        for scanned in secondary.scan()? {
            match scanned.record {
                Ok(record) if record.is_success() => already_ok += 1,
                Ok(_) => failed.push(scanned.address),
                Err(e) => warn!("Skipping unreadable record {}: {}", scanned.address, e),
            }
        }
        info!(
            "{} failed record(s) to revisit, {} already successful",
            failed.len(),
            already_ok
        );

        let reports = stream::iter(failed.iter())
            .map(|address| self.reevaluate_contract(address, primary, secondary))
            .buffer_unordered(self.processing.concurrency);

        self.drive("Re-evaluation Pass", reports, Some(failed.len()))
            .await
    }

    async fn reevaluate_contract(
        &self,
        address: &str,
        primary: &OutcomeStore,
        secondary: &OutcomeStore,
    ) -> ContractReport {
        let symexec_result = match primary.read(address) {
            Ok(Some(record)) => match record.eval_result() {
                Some(result) => result.symexec_result.clone(),
                None => {
                    debug!("{}: first-pass record is a failure", address);
                    return ContractReport::skipped(SkipReason::NoReusableEstimate);
                }
            },
            Ok(None) => {
                debug!("{}: no first-pass record", address);
                return ContractReport::skipped(SkipReason::NoReusableEstimate);
            }
            Err(e) => {
                warn!("{}: unreadable first-pass record: {}", address, e);
                return ContractReport::skipped(SkipReason::NoReusableEstimate);
            }
        };

        let _claim = match secondary.try_claim(address) {
            Ok(Some(claim)) => claim,
            Ok(None) => return ContractReport::skipped(SkipReason::AlreadyProcessed),
            Err(e) => {
                error!("Failed to claim {}: {}", address, e);
                return ContractReport::store_fault();
            }
        };

        info!("Re-evaluating {}", address);
        let result = guarded(self.pipeline.reevaluate(address, symexec_result)).await;
        persist(secondary, address, result)
    }
}
