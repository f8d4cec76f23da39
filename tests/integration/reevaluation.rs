use anyhow::Result;
use gas_estimate_eval::processor::CorpusOrchestrator;
use gas_estimate_eval::types::outcome::{EvalError, EvalErrorKind, OutcomeRecord};

use crate::common::{
    call, contract, corpus, count, estimates, pipeline, processing, verified_source, MockCompiler,
    MockEstimator, MockExplorer, TestStore,
};

const SELECTOR: &str = "0xabcdef12";
const OTHER: &str = "0x11223344";

fn feed_for(explorer: MockExplorer, address: &str) -> MockExplorer {
    explorer.with_pages(
        address,
        vec![
            vec![call(SELECTOR, 42000), call(OTHER, 120000)],
            vec![call(SELECTOR, 30000), call(OTHER, 100000)],
        ],
    )
}

#[tokio::test]
async fn test_reevaluation_reproduces_primary_summaries() -> Result<()> {
    let test_store = TestStore::new()?;
    let ok = contract(1, 100);
    let failed = contract(2, 100);

    // Primary pass: one success, one compile failure
    let explorer = feed_for(MockExplorer::new(), &ok.address)
        .with_source(&ok.address, verified_source(&ok.name))
        .with_source(&failed.address, verified_source(&failed.name));
    let estimator = MockEstimator::new().with_output(
        &ok.name,
        estimates(&[(SELECTOR, 21000), (OTHER, 110000)]),
        Some(75.0),
    );
    let compiler = MockCompiler::new().failing_for(&failed.name);
    let primary_pipeline = pipeline(explorer, compiler, estimator);
    CorpusOrchestrator::new(&primary_pipeline, processing(1))?
        .run_primary(&corpus(vec![ok.clone(), failed.clone()]), &test_store.store)
        .await?;

    // Secondary pass recorded both as failed
    let secondary = test_store.pass("retry")?;
    let marker = OutcomeRecord::failure(&EvalError::Unexpected {
        message: "rate limited".to_string(),
        trace: "Explorer error: HTTP status 429".to_string(),
    });
    secondary.commit(&ok.address, &marker)?;
    secondary.commit(&failed.address, &marker)?;

    let compiler = MockCompiler::new();
    let estimator = MockEstimator::new();
    let compile_calls = compiler.counter();
    let estimate_calls = estimator.counter();
    let rerun_pipeline = pipeline(feed_for(MockExplorer::new(), &ok.address), compiler, estimator);
    let stats = CorpusOrchestrator::new(&rerun_pipeline, processing(2))?
        .run_reevaluation(&test_store.store, &secondary)
        .await?;

    assert_eq!(stats.contracts_seen, 2);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.skipped_no_estimate, 1);
    assert_eq!(count(&compile_calls), 0);
    assert_eq!(count(&estimate_calls), 0);

    let original = test_store.store.read(&ok.address)?.expect("primary record");
    let rerun = secondary.read(&ok.address)?.expect("secondary record");
    let (original, rerun) = match (original.eval_result(), rerun.eval_result()) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => anyhow::bail!("both records should be successes"),
    };
    assert_eq!(original.functions, rerun.functions);
    assert_eq!(original.gas_class, rerun.gas_class);
    assert_eq!(original.summary, rerun.summary);
    assert_eq!(rerun.symexec_result.cov_percentage, Some(75.0));

    // No reusable estimate: the secondary failure is left untouched
    assert_eq!(
        secondary.read(&failed.address)?.and_then(|r| r.error_kind()),
        Some(EvalErrorKind::Unexpected)
    );
    Ok(())
}

#[tokio::test]
async fn test_reevaluation_ignores_successful_secondary_records() -> Result<()> {
    let test_store = TestStore::new()?;
    let secondary = test_store.pass("retry")?;
    let ok = contract(3, 100);

    let explorer = feed_for(MockExplorer::new(), &ok.address)
        .with_source(&ok.address, verified_source(&ok.name));
    let estimator =
        MockEstimator::new().with_output(&ok.name, estimates(&[(SELECTOR, 21000)]), None);
    let pipeline = pipeline(explorer, MockCompiler::new(), estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(1))?;
    orchestrator
        .run_primary(&corpus(vec![ok.clone()]), &secondary)
        .await?;

    let stats = orchestrator
        .run_reevaluation(&test_store.store, &secondary)
        .await?;
    assert_eq!(stats.contracts_seen, 0);
    Ok(())
}
