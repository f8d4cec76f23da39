use anyhow::Result;
use gas_estimate_eval::processor::CorpusOrchestrator;
use gas_estimate_eval::types::outcome::EvalErrorKind;

use crate::common::{
    call, contract, corpus, count, estimates, pipeline, processing, verified_source, MockCompiler,
    MockEstimator, MockExplorer, TestStore,
};

const SELECTOR: &str = "0xabcdef12";

/// Contracts 0..n, each verified, estimated and with one matching transaction
fn healthy_explorer(n: usize) -> (MockExplorer, MockEstimator) {
    let mut explorer = MockExplorer::new();
    let mut estimator = MockEstimator::new();
    for i in 0..n {
        let c = contract(i, 100);
        explorer = explorer
            .with_source(&c.address, verified_source(&c.name))
            .with_pages(&c.address, vec![vec![call(SELECTOR, 40000 + i as u64)]]);
        estimator = estimator.with_output(&c.name, estimates(&[(SELECTOR, 40000)]), Some(90.0));
    }
    (explorer, estimator)
}

#[tokio::test]
async fn test_primary_pass_persists_every_outcome() -> Result<()> {
    let test_store = TestStore::new()?;
    let ok = contract(1, 100);
    let unverified = contract(2, 100);
    let broken = contract(3, 100);
    let quiet = contract(4, 100);
    let low_signal = contract(5, 10);

    let explorer = MockExplorer::new()
        .with_source(&ok.address, verified_source(&ok.name))
        .with_pages(&ok.address, vec![vec![call(SELECTOR, 42000)]])
        .with_source(&broken.address, verified_source(&broken.name))
        .with_source(&quiet.address, verified_source(&quiet.name))
        .with_pages(&quiet.address, vec![vec![call("0x99999999", 42000)]]);
    let compiler = MockCompiler::new().failing_for(&broken.name);
    let estimator = MockEstimator::new()
        .with_output(&ok.name, estimates(&[(SELECTOR, 21000)]), None)
        .with_output(&quiet.name, estimates(&[(SELECTOR, 21000)]), None);
    let pipeline = pipeline(explorer, compiler, estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(1))?;

    let contracts = corpus(vec![
        ok.clone(),
        unverified.clone(),
        broken.clone(),
        quiet.clone(),
        low_signal.clone(),
    ]);
    let stats = orchestrator.run_primary(&contracts, &test_store.store).await?;

    assert_eq!(stats.contracts_seen, 5);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.skipped_low_signal, 1);
    assert_eq!(stats.failed.get(&EvalErrorKind::SourceUnavailable), Some(&1));
    assert_eq!(stats.failed.get(&EvalErrorKind::CompilationFailed), Some(&1));
    assert_eq!(stats.failed.get(&EvalErrorKind::NoMatchingTransactions), Some(&1));
    assert_eq!(stats.persist_failures, 0);

    let store = &test_store.store;
    let record = store.read(&ok.address)?.expect("success record");
    assert!(record.is_success());
    assert_eq!(record.eval_result().map(|r| r.summary.mean), Some(0.5));
    assert_eq!(
        store.read(&unverified.address)?.and_then(|r| r.error_kind()),
        Some(EvalErrorKind::SourceUnavailable)
    );
    assert_eq!(
        store.read(&broken.address)?.and_then(|r| r.error_kind()),
        Some(EvalErrorKind::CompilationFailed)
    );
    assert_eq!(
        store.read(&quiet.address)?.and_then(|r| r.error_kind()),
        Some(EvalErrorKind::NoMatchingTransactions)
    );
    assert!(!store.exists(&low_signal.address)?);
    Ok(())
}

#[tokio::test]
async fn test_second_run_makes_no_adapter_calls() -> Result<()> {
    let test_store = TestStore::new()?;
    let (explorer, estimator) = healthy_explorer(5);
    let (source_calls, page_calls) = explorer.counters();
    let compiler = MockCompiler::new();
    let compile_calls = compiler.counter();
    let estimate_calls = estimator.counter();
    let pipeline = pipeline(explorer, compiler, estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(1))?;
    let contracts = corpus((0..5).map(|i| contract(i, 100)).collect());

    let first = orchestrator.run_primary(&contracts, &test_store.store).await?;
    assert_eq!(first.succeeded, 5);
    let before = (
        count(&source_calls),
        count(&page_calls),
        count(&compile_calls),
        count(&estimate_calls),
    );
    assert_eq!(before.0, 5);

    let second = orchestrator.run_primary(&contracts, &test_store.store).await?;
    assert_eq!(second.skipped_existing, 5);
    assert_eq!(second.evaluated(), 0);
    assert_eq!(
        (
            count(&source_calls),
            count(&page_calls),
            count(&compile_calls),
            count(&estimate_calls),
        ),
        before
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_pass_writes_one_record_per_contract() -> Result<()> {
    let test_store = TestStore::new()?;
    let (explorer, estimator) = healthy_explorer(12);
    let pipeline = pipeline(explorer, MockCompiler::new(), estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(4))?;
    let contracts = corpus((0..12).map(|i| contract(i, 100)).collect());

    let stats = orchestrator.run_primary(&contracts, &test_store.store).await?;
    assert_eq!(stats.succeeded, 12);

    let scanned = test_store.store.scan()?;
    assert_eq!(scanned.len(), 12);
    assert!(scanned.iter().all(|s| s.record.as_ref().is_ok_and(|r| r.is_success())));

    // No claim or temp files left behind
    let leftovers = std::fs::read_dir(test_store.store.dir())?
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_name().to_string_lossy().ends_with(".json"))
        .count();
    assert_eq!(leftovers, 0);
    Ok(())
}

#[tokio::test]
async fn test_interrupted_pass_resumes_remaining_contracts() -> Result<()> {
    let test_store = TestStore::new()?;
    let (explorer, estimator) = healthy_explorer(6);
    let compiler = MockCompiler::new();
    let compile_calls = compiler.counter();
    let pipeline = pipeline(explorer, compiler, estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(2))?;

    let partial = corpus((0..3).map(|i| contract(i, 100)).collect());
    orchestrator.run_primary(&partial, &test_store.store).await?;
    assert_eq!(count(&compile_calls), 3);

    let full = corpus((0..6).map(|i| contract(i, 100)).collect());
    let stats = orchestrator.run_primary(&full, &test_store.store).await?;
    assert_eq!(stats.skipped_existing, 3);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(count(&compile_calls), 6);
    Ok(())
}

#[tokio::test]
async fn test_unusable_store_is_counted_as_persist_failure() -> Result<()> {
    let test_store = TestStore::new()?;
    let (explorer, estimator) = healthy_explorer(2);
    let compiler = MockCompiler::new();
    let compile_calls = compiler.counter();
    let pipeline = pipeline(explorer, compiler, estimator);
    let orchestrator = CorpusOrchestrator::new(&pipeline, processing(1))?;

    // Claims cannot be created once the pass directory is gone
    std::fs::remove_dir_all(test_store.store.dir())?;
    let contracts = corpus((0..2).map(|i| contract(i, 100)).collect());
    let stats = orchestrator.run_primary(&contracts, &test_store.store).await?;

    assert_eq!(stats.skipped_existing, 0);
    assert_eq!(stats.persist_failures, 2);
    assert_eq!(stats.failed.get(&EvalErrorKind::Unexpected), Some(&2));
    assert_eq!(count(&compile_calls), 0);
    Ok(())
}
