//! Compiler and symbolic execution settings handed to the external adapters

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::SymExecConfig;

/// Optimizer detail flags and their baseline values
pub const DEFAULT_OPTIMIZER_DETAILS: &[(&str, bool)] = &[
    ("peephole", true),
    ("inliner", true),
    ("jumpdestRemover", true),
    ("orderLiterals", false),
    ("deduplicate", false),
    ("cse", false),
    ("constantOptimizer", false),
    ("yul", false),
];

/// A single Solidity source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Compiler settings derived from explorer metadata for one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerSettings {
    pub version: String,
    pub evm_version: String,
    pub optimizer_enabled: bool,
    pub optimizer_runs: u32,
    pub via_ir: bool,
    pub details_enabled: bool,
    pub details: BTreeMap<String, bool>,
}

impl CompilerSettings {
    /// Baseline optimizer details with explorer-reported flags layered on top
    pub fn details_with_overrides(overrides: &BTreeMap<String, bool>) -> BTreeMap<String, bool> {
        let mut details: BTreeMap<String, bool> = DEFAULT_OPTIMIZER_DETAILS
            .iter()
            .map(|(name, enabled)| (name.to_string(), *enabled))
            .collect();
        details.extend(overrides.iter().map(|(k, v)| (k.clone(), *v)));
        details
    }

    /// `settings` object of a solc standard-JSON input
    pub fn to_solc_settings(&self) -> serde_json::Value {
        let mut optimizer = serde_json::json!({
            "enabled": self.optimizer_enabled,
            "runs": self.optimizer_runs,
        });
        if self.details_enabled {
            optimizer["details"] = serde_json::json!(self.details);
        }

        let mut settings = serde_json::json!({
            "optimizer": optimizer,
            "outputSelection": {
                "*": {
                    "": ["ast"],
                    "*": [
                        "metadata",
                        "evm.bytecode",
                        "evm.legacyAssembly",
                        "evm.deployedBytecode",
                        "evm.methodIdentifiers",
                        "ir"
                    ],
                },
            },
        });
        if self.via_ir {
            settings["viaIR"] = serde_json::Value::Bool(true);
        }
        if !self.evm_version.is_empty() && !self.evm_version.eq_ignore_ascii_case("default") {
            settings["evmVersion"] = serde_json::Value::String(self.evm_version.clone());
        }
        settings
    }
}

/// Path-search strategy of the symbolic estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    #[default]
    Bfs,
    Dfs,
    NaiveRandom,
    WeightedRandom,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchStrategy::Bfs => "bfs",
            SearchStrategy::Dfs => "dfs",
            SearchStrategy::NaiveRandom => "naive-random",
            SearchStrategy::WeightedRandom => "weighted-random",
        };
        write!(f, "{}", name)
    }
}

/// Settings for one symbolic execution run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymExecSettings {
    pub max_depth: u32,
    pub call_depth_limit: u32,
    pub strategy: SearchStrategy,
    pub loop_bound: u32,
    pub transaction_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onchain_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_constraints: Option<bool>,
}

impl SymExecSettings {
    /// Configured defaults with on-chain state enabled for `address`
    pub fn for_address(config: &SymExecConfig, address: &str) -> Self {
        Self {
            max_depth: config.max_depth,
            call_depth_limit: config.call_depth_limit,
            strategy: config.strategy,
            loop_bound: config.loop_bound,
            transaction_count: config.transaction_count,
            onchain_address: Some(address.to_string()),
            ignore_constraints: Some(config.ignore_constraints),
        }
    }
}
