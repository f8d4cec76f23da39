//! Common Test Utilities
//!
//! In-memory implementations of the explorer and tool adapters, plus corpus
//! and store helpers shared by the unit and integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gas_estimate_eval::adapters::{Compiler, SymbolicEstimator};
use gas_estimate_eval::config::{EvaluationConfig, ProcessingConfig, SymExecConfig};
use gas_estimate_eval::errors::{ExplorerError, ExplorerResult};
use gas_estimate_eval::evaluator::{AccuracyEvaluator, ContractPipeline};
use gas_estimate_eval::explorer::{
    ConcreteTransaction, RawSourceMetadata, SourceProvider, TransactionPage, TransactionSource,
};
use gas_estimate_eval::store::OutcomeStore;
use gas_estimate_eval::types::accuracy::{FunctionGasEstimate, SymExecOutput};
use gas_estimate_eval::types::contract::{ContractCorpus, ContractRecord};
use gas_estimate_eval::types::settings::{CompilerSettings, SourceFile, SymExecSettings};
use gas_estimate_eval::utils::version::SolidityVersion;
use tempfile::TempDir;

/// Deterministic contract address for index `i`
pub fn address(i: usize) -> String {
    format!("0x{:040x}", i)
}

pub fn contract(i: usize, tx_count: u64) -> ContractRecord {
    ContractRecord {
        address: address(i),
        name: format!("Contract{}", i),
        balance: "0".to_string(),
        tx_count,
        compiler: "v0.8.13+commit.abaa5c0e".to_string(),
    }
}

pub fn corpus(records: Vec<ContractRecord>) -> ContractCorpus {
    ContractCorpus::from_records(records)
}

/// Verified single-file source compiled with 0.8.13
pub fn verified_source(name: &str) -> RawSourceMetadata {
    RawSourceMetadata {
        source_code: format!("contract {} {{ function f() external {{}} }}", name),
        contract_name: name.to_string(),
        compiler_version: "v0.8.13+commit.abaa5c0e".to_string(),
        optimization_used: "1".to_string(),
        runs: "200".to_string(),
        evm_version: "Default".to_string(),
    }
}

/// Transaction calling `selector` with some argument bytes
pub fn call(selector: &str, gas_used: u64) -> ConcreteTransaction {
    ConcreteTransaction::new(format!("{}{}", selector, "00".repeat(32)), gas_used)
}

pub fn estimates(pairs: &[(&str, u64)]) -> FunctionGasEstimate {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Explorer serving fixed sources and paged transaction lists
#[derive(Default)]
pub struct MockExplorer {
    sources: HashMap<String, RawSourceMetadata>,
    pages: HashMap<String, Vec<Vec<ConcreteTransaction>>>,
    /// Addresses whose transaction feed returns an API error
    broken_feeds: Vec<String>,
    source_calls: Arc<AtomicUsize>,
    page_calls: Arc<AtomicUsize>,
}

impl MockExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, address: &str, meta: RawSourceMetadata) -> Self {
        self.sources.insert(address.to_string(), meta);
        self
    }

    pub fn with_pages(mut self, address: &str, pages: Vec<Vec<ConcreteTransaction>>) -> Self {
        self.pages.insert(address.to_string(), pages);
        self
    }

    pub fn with_broken_feed(mut self, address: &str) -> Self {
        self.broken_feeds.push(address.to_string());
        self
    }

    pub fn source_calls(&self) -> usize {
        self.source_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Shared handles to the (source, page) call counters
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.source_calls.clone(), self.page_calls.clone())
    }
}

impl SourceProvider for MockExplorer {
    async fn fetch_source(&self, address: &str) -> ExplorerResult<RawSourceMetadata> {
        self.source_calls.fetch_add(1, Ordering::SeqCst);
        self.sources
            .get(address)
            .cloned()
            .ok_or_else(|| ExplorerError::SourceNotVerified {
                address: address.to_string(),
            })
    }
}

impl TransactionSource for MockExplorer {
    async fn list_transactions(
        &self,
        address: &str,
        page: u32,
        _page_size: u32,
    ) -> ExplorerResult<TransactionPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_feeds.iter().any(|a| a == address) {
            return Err(ExplorerError::Api {
                action: "txlist".to_string(),
                message: "NOTOK".to_string(),
            });
        }
        let index = (page as usize).saturating_sub(1);
        match self.pages.get(address).and_then(|pages| pages.get(index)) {
            Some(txs) if !txs.is_empty() => Ok(TransactionPage::Transactions(txs.clone())),
            _ => Ok(TransactionPage::Exhausted),
        }
    }
}

/// Compiler returning an empty artifact, or failing for listed contract names
#[derive(Default)]
pub struct MockCompiler {
    failing: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl MockCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, contract_name: &str) -> Self {
        self.failing.push(format!("{}.sol", contract_name));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Compiler for MockCompiler {
    async fn compile(
        &self,
        sources: &[SourceFile],
        _settings: &CompilerSettings,
    ) -> Result<serde_json::Value, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if sources.iter().any(|s| self.failing.contains(&s.name)) {
            return Err("ParserError: Expected ';'".to_string());
        }
        Ok(serde_json::json!({ "contracts": {} }))
    }
}

/// Estimator returning fixed estimates per contract name
#[derive(Default)]
pub struct MockEstimator {
    outputs: HashMap<String, SymExecOutput>,
    calls: Arc<AtomicUsize>,
}

impl MockEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(
        mut self,
        contract_name: &str,
        function_gas: FunctionGasEstimate,
        coverage: Option<f64>,
    ) -> Self {
        let mut output = SymExecOutput::new(function_gas);
        output.cov_percentage = coverage;
        self.outputs.insert(contract_name.to_string(), output);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl SymbolicEstimator for MockEstimator {
    async fn symbolic_execute(
        &self,
        _sources: &[SourceFile],
        contract_name: &str,
        _artifact: &serde_json::Value,
        _settings: &SymExecSettings,
    ) -> Result<SymExecOutput, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .get(contract_name)
            .cloned()
            .ok_or_else(|| format!("no estimate for {}", contract_name))
    }
}

pub type MockPipeline = ContractPipeline<MockExplorer, MockCompiler, MockEstimator>;

pub fn pipeline(
    explorer: MockExplorer,
    compiler: MockCompiler,
    estimator: MockEstimator,
) -> MockPipeline {
    pipeline_with(explorer, compiler, estimator, EvaluationConfig::default())
}

pub fn pipeline_with(
    explorer: MockExplorer,
    compiler: MockCompiler,
    estimator: MockEstimator,
    evaluation: EvaluationConfig,
) -> MockPipeline {
    ContractPipeline::new(
        explorer,
        compiler,
        estimator,
        AccuracyEvaluator::new(evaluation),
        SymExecConfig::default(),
        SolidityVersion::new(0, 4, 18),
    )
}

pub fn processing(concurrency: usize) -> ProcessingConfig {
    ProcessingConfig {
        concurrency,
        progress_interval: 1000,
        ..ProcessingConfig::default()
    }
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Scratch results directory removed when dropped
pub struct TestStore {
    pub dir: TempDir,
    pub store: OutcomeStore,
}

impl TestStore {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = OutcomeStore::open(dir.path(), None)?;
        Ok(Self { dir, store })
    }

    /// Store for a named pass under the same results directory
    pub fn pass(&self, prefix: &str) -> anyhow::Result<OutcomeStore> {
        Ok(OutcomeStore::open(self.dir.path(), Some(prefix))?)
    }
}
