//! Candidate contracts and the corpus they are loaded from

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};

/// One candidate contract from the corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub address: String,
    pub name: String,
    /// Locale-formatted balance with unit suffix, e.g. `1,234.5 Ether`
    #[serde(default)]
    pub balance: String,
    #[serde(rename = "txcount", alias = "tx_count")]
    pub tx_count: u64,
    #[serde(default)]
    pub compiler: String,
}

impl ContractRecord {
    /// Numeric balance with the unit suffix and thousands separators removed
    pub fn balance_value(&self) -> f64 {
        let numeric: String = self
            .balance
            .trim()
            .trim_end_matches(|c: char| c.is_alphabetic() || c.is_whitespace())
            .chars()
            .filter(|c| *c != ',')
            .collect();
        numeric.parse().unwrap_or(0.0)
    }
}

/// Ordered, deduplicated corpus of candidate contracts
///
/// Sorted by transaction count descending so high-signal contracts are
/// evaluated first. Ties keep file order.
#[derive(Debug, Clone, Default)]
pub struct ContractCorpus {
    records: Vec<ContractRecord>,
}

impl ContractCorpus {
    pub fn from_records(records: Vec<ContractRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut records: Vec<ContractRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.address.to_ascii_lowercase()))
            .collect();
        records.sort_by(|a, b| b.tx_count.cmp(&a.tx_count));
        Self { records }
    }

    /// Load a line-delimited JSON corpus
    ///
    /// Blank lines are ignored; a malformed line aborts the load with its line number.
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(AppError::Io)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (index, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(AppError::Io)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: ContractRecord =
                serde_json::from_str(trimmed).map_err(|e| AppError::InvalidRecord {
                    line: index + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }

        let loaded = records.len();
        let corpus = Self::from_records(records);
        if corpus.len() < loaded {
            warn!(
                "Dropped {} duplicate addresses from corpus",
                loaded - corpus.len()
            );
        }
        info!("Loaded {} contracts from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
