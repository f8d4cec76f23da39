//! Per-contract pipeline: source -> settings -> compile -> estimate -> evaluate

use tracing::{debug, info};

use super::engine::AccuracyEvaluator;
use super::source::prepare_source;
use crate::adapters::{Compiler, SymbolicEstimator};
use crate::config::SymExecConfig;
use crate::errors::ExplorerError;
use crate::explorer::{SourceProvider, TransactionSource};
use crate::types::accuracy::SymExecOutput;
use crate::types::contract::ContractRecord;
use crate::types::outcome::{EvalError, EvalResult};
use crate::types::settings::SymExecSettings;
use crate::utils::version::SolidityVersion;

/// All collaborators needed to evaluate one contract
pub struct ContractPipeline<X, C, E> {
    explorer: X,
    compiler: C,
    estimator: E,
    evaluator: AccuracyEvaluator,
    symexec: SymExecConfig,
    min_version: SolidityVersion,
}

impl<X, C, E> ContractPipeline<X, C, E>
where
    X: SourceProvider + TransactionSource,
    C: Compiler,
    E: SymbolicEstimator,
{
    pub fn new(
        explorer: X,
        compiler: C,
        estimator: E,
        evaluator: AccuracyEvaluator,
        symexec: SymExecConfig,
        min_version: SolidityVersion,
    ) -> Self {
        Self {
            explorer,
            compiler,
            estimator,
            evaluator,
            symexec,
            min_version,
        }
    }

    pub fn explorer(&self) -> &X {
        &self.explorer
    }

    /// Full evaluation of a contract from its verified source
    pub async fn evaluate_contract(
        &self,
        record: &ContractRecord,
    ) -> Result<EvalResult, EvalError> {
        let address = record.address.as_str();

        let metadata = self
            .explorer
            .fetch_source(address)
            .await
            .map_err(|e| match e {
                ExplorerError::SourceNotVerified { .. } => {
                    EvalError::SourceUnavailable("no verified source".to_string())
                }
                other => EvalError::SourceUnavailable(format!("explorer error: {}", other)),
            })?;

        let prepared = prepare_source(&metadata, &record.name, &self.min_version)?;

        let artifact = self
            .compiler
            .compile(&prepared.sources, &prepared.settings)
            .await
            .map_err(EvalError::CompilationFailed)?;
        debug!("{}: compiled {}", address, prepared.contract_name);

        let settings = SymExecSettings::for_address(&self.symexec, address);
        let symexec_result = self
            .estimator
            .symbolic_execute(&prepared.sources, &prepared.contract_name, &artifact, &settings)
            .await
            .map_err(EvalError::SymbolicExecutionFailed)?;
        info!(
            "{}: estimator produced {} function estimate(s)",
            address,
            symexec_result.function_gas.len()
        );

        self.evaluator
            .evaluate(&self.explorer, address, symexec_result)
            .await
    }

    /// Evaluation only, reusing a persisted estimator output
    pub async fn reevaluate(
        &self,
        address: &str,
        symexec_result: SymExecOutput,
    ) -> Result<EvalResult, EvalError> {
        self.evaluator
            .evaluate(&self.explorer, address, symexec_result)
            .await
    }
}
