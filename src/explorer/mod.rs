//! Blockchain explorer integration
//!
//! This module provides everything the evaluator needs from an
//! Etherscan-compatible explorer:
//! - **Client** - Async HTTP client with retry, backoff and request spacing
//! - **Retry** - Exponential backoff helpers and timeout wrappers
//!
//! The evaluator only depends on the [`SourceProvider`] and
//! [`TransactionSource`] traits so tests can substitute in-memory feeds.

pub mod client;
pub mod retry;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ExplorerResult;

pub use client::ExplorerClient;
pub use retry::{calculate_next_backoff, execute_with_timeout};

/// Verified-source metadata as reported by the explorer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSourceMetadata {
    #[serde(rename = "SourceCode", default)]
    pub source_code: String,
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
    #[serde(rename = "CompilerVersion", default)]
    pub compiler_version: String,
    /// `"1"` when the optimizer was enabled
    #[serde(rename = "OptimizationUsed", default)]
    pub optimization_used: String,
    #[serde(rename = "Runs", default)]
    pub runs: String,
    #[serde(rename = "EVMVersion", default)]
    pub evm_version: String,
}

/// One concrete on-chain transaction sent to a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcreteTransaction {
    #[serde(default)]
    pub hash: String,
    /// Hex calldata; the first 10 characters are the selector
    pub input: String,
    #[serde(rename = "gasUsed", deserialize_with = "deserialize_quantity")]
    pub gas_used: u64,
}

impl ConcreteTransaction {
    pub fn new(input: impl Into<String>, gas_used: u64) -> Self {
        Self {
            hash: String::new(),
            input: input.into(),
            gas_used,
        }
    }
}

/// Explorers report quantities as decimal strings
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Text(String),
        Number(u64),
    }

    match Quantity::deserialize(deserializer)? {
        Quantity::Number(n) => Ok(n),
        Quantity::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One page of a newest-first transaction feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPage {
    Transactions(Vec<ConcreteTransaction>),
    /// The feed has no further results
    Exhausted,
}

/// Verified source lookup
#[allow(async_fn_in_trait)]
pub trait SourceProvider {
    async fn fetch_source(&self, address: &str) -> ExplorerResult<RawSourceMetadata>;
}

/// Paginated concrete transaction feed, newest first
#[allow(async_fn_in_trait)]
pub trait TransactionSource {
    /// `page` is 1-based
    async fn list_transactions(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> ExplorerResult<TransactionPage>;
}
