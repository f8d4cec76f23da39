use anyhow::Result;
use gas_estimate_eval::types::outcome::{EvalError, EvalErrorKind};

use crate::common::{
    address, call, contract, estimates, pipeline, verified_source, MockCompiler, MockEstimator,
    MockExplorer,
};

const SELECTOR: &str = "0xabcdef12";

#[tokio::test]
async fn test_full_pipeline_success() -> Result<()> {
    let record = contract(1, 100);
    let explorer = MockExplorer::new()
        .with_source(&record.address, verified_source("Contract1"))
        .with_pages(&record.address, vec![vec![call(SELECTOR, 42000)]]);
    let estimator =
        MockEstimator::new().with_output("Contract1", estimates(&[(SELECTOR, 21000)]), Some(87.5));
    let pipeline = pipeline(explorer, MockCompiler::new(), estimator);

    let result = pipeline.evaluate_contract(&record).await?;

    assert_eq!(result.summary.mean, 0.5);
    assert_eq!(result.symexec_result.cov_percentage, Some(87.5));
    Ok(())
}

#[tokio::test]
async fn test_unverified_source_is_source_unavailable() -> Result<()> {
    let record = contract(2, 100);
    let compiler = MockCompiler::new();
    let pipeline = pipeline(MockExplorer::new(), compiler, MockEstimator::new());

    let result = pipeline.evaluate_contract(&record).await;

    assert!(matches!(result, Err(EvalError::SourceUnavailable(_))));
    Ok(())
}

#[tokio::test]
async fn test_old_compiler_is_source_unavailable() -> Result<()> {
    let record = contract(3, 100);
    let mut meta = verified_source("Contract3");
    meta.compiler_version = "v0.4.11+commit.68ef5810".to_string();
    let explorer = MockExplorer::new().with_source(&record.address, meta);
    let pipeline = pipeline(explorer, MockCompiler::new(), MockEstimator::new());

    let err = match pipeline.evaluate_contract(&record).await {
        Err(e) => e,
        Ok(_) => anyhow::bail!("expected SourceUnavailable"),
    };

    assert_eq!(err.kind(), EvalErrorKind::SourceUnavailable);
    assert!(err.to_string().contains("0.4.11"));
    Ok(())
}

#[tokio::test]
async fn test_compile_failure_stops_pipeline() -> Result<()> {
    let record = contract(4, 100);
    let explorer = MockExplorer::new().with_source(&record.address, verified_source("Contract4"));
    let compiler = MockCompiler::new().failing_for("Contract4");
    let estimator =
        MockEstimator::new().with_output("Contract4", estimates(&[(SELECTOR, 1)]), None);
    let pipeline = pipeline(explorer, compiler, estimator);

    let result = pipeline.evaluate_contract(&record).await;

    assert!(matches!(
        result,
        Err(EvalError::CompilationFailed(ref m)) if m.contains("ParserError")
    ));
    Ok(())
}

#[tokio::test]
async fn test_estimator_failure_is_symbolic_execution_failed() -> Result<()> {
    let record = contract(5, 100);
    let explorer = MockExplorer::new().with_source(&record.address, verified_source("Contract5"));
    let pipeline = pipeline(explorer, MockCompiler::new(), MockEstimator::new());

    let result = pipeline.evaluate_contract(&record).await;

    assert!(matches!(result, Err(EvalError::SymbolicExecutionFailed(_))));
    Ok(())
}

#[tokio::test]
async fn test_reevaluate_skips_tools() -> Result<()> {
    let addr = address(6);
    let explorer = MockExplorer::new().with_pages(&addr, vec![vec![call(SELECTOR, 20000)]]);
    let pipeline = pipeline(explorer, MockCompiler::new(), MockEstimator::new());
    let output = gas_estimate_eval::types::accuracy::SymExecOutput::new(estimates(&[(
        SELECTOR, 25000,
    )]));

    let result = pipeline.reevaluate(&addr, output).await?;

    assert_eq!(result.summary.mean, 1.25);
    assert_eq!(result.gas_class[&4].count, 1);
    Ok(())
}
