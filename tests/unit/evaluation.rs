use anyhow::Result;
use gas_estimate_eval::config::EvaluationConfig;
use gas_estimate_eval::evaluator::AccuracyEvaluator;
use gas_estimate_eval::explorer::ConcreteTransaction;
use gas_estimate_eval::types::accuracy::SymExecOutput;
use gas_estimate_eval::types::classification::GasClassBasis;
use gas_estimate_eval::types::outcome::{EvalError, EvalErrorKind, OutcomeRecord};

use crate::common::{address, call, estimates, MockExplorer};

const SELECTOR: &str = "0xabcdef12";

fn output(pairs: &[(&str, u64)]) -> SymExecOutput {
    SymExecOutput::new(estimates(pairs))
}

#[tokio::test]
async fn test_single_sample_summaries() -> Result<()> {
    let addr = address(1);
    let feed = MockExplorer::new().with_pages(&addr, vec![vec![call(SELECTOR, 42000)]]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await?;

    for summary in [
        result.summary,
        result.functions[SELECTOR],
        result.gas_class[&4],
    ] {
        assert_eq!(summary.sum, 0.5);
        assert_eq!(summary.mean, 0.5);
        assert_eq!(summary.median, 0.5);
        assert_eq!(summary.count, 1);
    }
    assert_eq!(result.functions.len(), 1);
    assert_eq!(result.gas_class.len(), 1);
    assert_eq!(result.symexec_result.function_gas[SELECTOR], 21000);
    Ok(())
}

#[tokio::test]
async fn test_gas_class_boundary_is_half_open() -> Result<()> {
    let addr = address(2);
    let feed = MockExplorer::new().with_pages(
        &addr,
        vec![vec![call(SELECTOR, 50000), call(SELECTOR, 49999)]],
    );
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 50000)]))
        .await?;

    assert_eq!(result.gas_class[&5].count, 1);
    assert_eq!(result.gas_class[&5].mean, 1.0);
    assert_eq!(result.gas_class[&4].count, 1);
    Ok(())
}

#[tokio::test]
async fn test_estimated_gas_class_basis() -> Result<()> {
    let addr = address(3);
    let feed = MockExplorer::new().with_pages(&addr, vec![vec![call(SELECTOR, 60000)]]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig {
        gas_class_basis: GasClassBasis::Estimated,
        ..EvaluationConfig::default()
    });

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 30000)]))
        .await?;

    // 30000 estimated lands in [20000, 50000)
    assert_eq!(result.gas_class.keys().copied().collect::<Vec<_>>(), vec![4]);
    Ok(())
}

#[tokio::test]
async fn test_per_function_cap_across_pages() -> Result<()> {
    let addr = address(4);
    let other = "0x11223344";
    let page = |gas: u64| -> Vec<ConcreteTransaction> {
        (0..20)
            .map(|_| call(SELECTOR, gas))
            .chain(std::iter::once(call(other, 10000)))
            .collect()
    };
    let feed = MockExplorer::new().with_pages(&addr, vec![page(42000), page(42000), page(42000)]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000), (other, 10000)]))
        .await?;

    assert_eq!(result.functions[SELECTOR].count, 30);
    assert_eq!(result.functions[other].count, 3);
    assert_eq!(result.summary.count, 33);
    Ok(())
}

#[tokio::test]
async fn test_no_matching_transactions() -> Result<()> {
    let addr = address(5);
    let feed = MockExplorer::new().with_pages(
        &addr,
        vec![vec![call("0x99999999", 42000), ConcreteTransaction::new("0x", 21000)]],
    );
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await;
    let err = match result {
        Err(e) => e,
        Ok(_) => anyhow::bail!("expected NoMatchingTransactions"),
    };
    assert_eq!(err.kind(), EvalErrorKind::NoMatchingTransactions);

    let json = serde_json::to_value(OutcomeRecord::failure(&err))?;
    assert_eq!(json["status"], 0);
    assert!(json["result"].get("summary").is_none());
    assert_eq!(json["result"]["kind"], "NoMatchingTransactions");
    Ok(())
}

#[tokio::test]
async fn test_zero_gas_transactions_ignored() -> Result<()> {
    let addr = address(6);
    let feed = MockExplorer::new().with_pages(
        &addr,
        vec![vec![call(SELECTOR, 0), call(SELECTOR, 21000)]],
    );
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await?;
    assert_eq!(result.summary.count, 1);
    assert_eq!(result.summary.mean, 1.0);
    Ok(())
}

#[tokio::test]
async fn test_paging_stops_at_page_budget_once_samples_suffice() -> Result<()> {
    let addr = address(7);
    let selectors = ["0x00000001", "0x00000002", "0x00000003", "0x00000004", "0x00000005"];
    let page: Vec<ConcreteTransaction> = selectors
        .iter()
        .flat_map(|s| [call(s, 30000), call(s, 30000)])
        .collect();
    let feed = MockExplorer::new().with_pages(&addr, vec![page; 20]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());
    let pairs: Vec<(&str, u64)> = selectors.iter().map(|s| (*s, 30000)).collect();

    let result = evaluator.evaluate(&feed, &addr, output(&pairs)).await?;

    assert_eq!(feed.page_calls(), 10);
    assert_eq!(result.summary.count, 100);
    Ok(())
}

#[tokio::test]
async fn test_paging_continues_until_exhausted_below_min_samples() -> Result<()> {
    let addr = address(8);
    let feed = MockExplorer::new().with_pages(&addr, vec![vec![call(SELECTOR, 42000)]; 15]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await?;

    // 15 data pages then the exhausted marker
    assert_eq!(feed.page_calls(), 16);
    assert_eq!(result.summary.count, 15);
    Ok(())
}

#[tokio::test]
async fn test_paging_respects_hard_limit() -> Result<()> {
    let addr = address(9);
    let feed = MockExplorer::new().with_pages(&addr, vec![vec![call("0x99999999", 1000)]; 40]);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig {
        page_hard_limit: 12,
        ..EvaluationConfig::default()
    });

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await;

    assert!(matches!(result, Err(EvalError::NoMatchingTransactions)));
    assert_eq!(feed.page_calls(), 12);
    Ok(())
}

#[tokio::test]
async fn test_feed_error_is_unexpected_with_trace() -> Result<()> {
    let addr = address(10);
    let feed = MockExplorer::new().with_broken_feed(&addr);
    let evaluator = AccuracyEvaluator::new(EvaluationConfig::default());

    let result = evaluator
        .evaluate(&feed, &addr, output(&[(SELECTOR, 21000)]))
        .await;

    match result {
        Err(err @ EvalError::Unexpected { .. }) => {
            assert!(err.trace().is_some_and(|t| t.contains("NOTOK")));
        }
        _ => anyhow::bail!("expected an Unexpected failure"),
    }
    assert_eq!(feed.page_calls(), 1);
    Ok(())
}
