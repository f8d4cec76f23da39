//! Accuracy samples, summaries and estimator output types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::math::{mean, median};

/// Length of a canonical selector: `0x` + 4 bytes of hex
pub const SELECTOR_LEN: usize = 10;

/// Canonical 10-character selector prefix of an estimator key or calldata.
///
/// Inputs shorter than a selector are returned unchanged, so a bare `0x`
/// (plain ether transfer) never matches a real function.
pub fn selector_prefix(input: &str) -> &str {
    input.get(..SELECTOR_LEN).unwrap_or(input)
}

/// Whether a string is a well-formed `0x` + 8 hex digit selector
pub fn is_valid_selector(selector: &str) -> bool {
    selector.len() == SELECTOR_LEN
        && selector.starts_with("0x")
        && hex::decode(&selector[2..]).map(|b| b.len() == 4).unwrap_or(false)
}

/// Per-function gas estimates keyed by canonical selector
pub type FunctionGasEstimate = BTreeMap<String, u64>;

/// `{sum, mean, median, count}` over a non-empty set of accuracy samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
}

impl AccuracySummary {
    /// Summarise samples; `None` for an empty set so callers must handle the
    /// zero-sample case explicitly.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        Some(Self {
            sum: samples.iter().sum(),
            mean: mean(samples)?,
            median: median(samples)?,
            count: samples.len(),
        })
    }

    /// Mean recomputed from the stored sum, as a percentage
    pub fn mean_percentage(&self) -> f64 {
        self.sum / self.count as f64 * 100.0
    }
}

/// Raw output of the symbolic estimator.
///
/// Only `function_gas` and `cov_percentage` are interpreted; every other field
/// (creation/runtime gas maps, loop gas, ...) is carried verbatim so a persisted
/// outcome holds the complete estimator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymExecOutput {
    pub function_gas: FunctionGasEstimate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cov_percentage: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SymExecOutput {
    pub fn new(function_gas: FunctionGasEstimate) -> Self {
        Self {
            function_gas,
            cov_percentage: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Estimates re-keyed by canonical selector prefix
    pub fn normalised_estimates(&self) -> FunctionGasEstimate {
        self.function_gas
            .iter()
            .map(|(key, gas)| (selector_prefix(key).to_string(), *gas))
            .collect()
    }
}
