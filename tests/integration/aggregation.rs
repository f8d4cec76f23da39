use anyhow::Result;
use gas_estimate_eval::analysis::{AggregationEngine, OutputFormat, ReportFormatter};
use gas_estimate_eval::processor::CorpusOrchestrator;
use gas_estimate_eval::types::outcome::{EvalError, OutcomeRecord};

use crate::common::{
    address, call, contract, corpus, estimates, pipeline, processing, verified_source,
    MockCompiler, MockEstimator, MockExplorer, TestStore,
};

const SELECTOR: &str = "0xabcdef12";

#[tokio::test]
async fn test_reports_over_persisted_pass() -> Result<()> {
    let test_store = TestStore::new()?;
    let a = contract(1, 100);
    let b = contract(2, 100);

    let explorer = MockExplorer::new()
        .with_source(&a.address, verified_source(&a.name))
        .with_pages(&a.address, vec![vec![call(SELECTOR, 42000)]])
        .with_source(&b.address, verified_source(&b.name))
        .with_pages(&b.address, vec![vec![call(SELECTOR, 10000), call(SELECTOR, 10000)]]);
    let estimator = MockEstimator::new()
        .with_output(&a.name, estimates(&[(SELECTOR, 21000)]), Some(95.0))
        .with_output(&b.name, estimates(&[(SELECTOR, 15000)]), Some(45.0));
    let pipeline = pipeline(explorer, MockCompiler::new(), estimator);
    let contracts = corpus(vec![a.clone(), b.clone()]);
    CorpusOrchestrator::new(&pipeline, processing(1))?
        .run_primary(&contracts, &test_store.store)
        .await?;
    test_store.store.commit(
        &address(3),
        &OutcomeRecord::failure(&EvalError::SymbolicExecutionFailed("timeout".into())),
    )?;

    let engine = AggregationEngine::from_store(&test_store.store)?;
    let counts = engine.counts();
    assert_eq!(counts.total_files, 3);
    assert_eq!(counts.succeeded, 2);
    assert_eq!(counts.failed, 1);

    let accuracy = engine.analyse_accuracy();
    assert_eq!(accuracy.contract_accuracy.mean, Some(100.0));
    assert_eq!(accuracy.coverage.mean, Some(70.0));

    let coverage = engine.analyse_coverage();
    assert_eq!(coverage.classes[4].values, vec![150.0]);
    assert_eq!(coverage.classes[9].values, vec![50.0]);

    let gas = engine.analyse_gas_classes();
    assert_eq!(gas.classes[3].values, vec![150.0]);
    assert_eq!(gas.classes[4].values, vec![50.0]);

    let versions = engine.analyse_versions(&contracts);
    assert_eq!(versions.versions.len(), 2);
    assert_eq!(versions.versions[0].version, "0.8.x");
    assert_eq!(versions.versions[0].succeeded, 2);
    assert_eq!(versions.versions[1].version, "unknown");

    let json = ReportFormatter::format_errors(&engine.analyse_errors(), &OutputFormat::Json)?;
    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    let rows = parsed["categories"].as_array().cloned().unwrap_or_default();
    let symexec = rows
        .iter()
        .find(|r| r["category"] == "SymbolicExecutionFailed")
        .expect("symbolic execution row");
    assert_eq!(symexec["count"], 1);
    Ok(())
}

#[tokio::test]
async fn test_malformed_records_are_skipped() -> Result<()> {
    let test_store = TestStore::new()?;
    test_store.store.commit(
        &address(1),
        &OutcomeRecord::failure(&EvalError::NoMatchingTransactions),
    )?;
    std::fs::write(
        test_store.store.dir().join(format!("{}.json", address(2))),
        "{ not json",
    )?;
    std::fs::write(
        test_store.store.dir().join(format!("{}.json", address(3))),
        r#"{"status": 7, "result": {}}"#,
    )?;

    let engine = AggregationEngine::from_store(&test_store.store)?;
    let counts = engine.counts();
    assert_eq!(counts.total_files, 3);
    assert_eq!(counts.malformed, 2);
    assert_eq!(counts.failed, 1);

    let report = engine.analyse_errors();
    let total: usize = report.categories.iter().map(|c| c.count).sum();
    assert_eq!(total, 1);

    let console =
        ReportFormatter::format_accuracy(&engine.analyse_accuracy(), &OutputFormat::Console)?;
    assert!(console.contains("GAS ESTIMATE ACCURACY"));
    Ok(())
}
