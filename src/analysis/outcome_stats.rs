//! Outcome breakdowns by failure kind and compiler version

use std::collections::{BTreeMap, HashMap};

use super::types::{ErrorBreakdownReport, OutcomeCategory, VersionReport, VersionRow};
use super::OutcomeSet;
use crate::types::contract::ContractCorpus;
use crate::types::outcome::EvalErrorKind;
use crate::utils::math::safe_percentage;
use crate::utils::version::SolidityVersion;

const UNKNOWN_VERSION: &str = "unknown";

pub struct OutcomeStatsAnalyser;

impl OutcomeStatsAnalyser {
    pub fn analyse_errors(outcomes: &OutcomeSet) -> ErrorBreakdownReport {
        let mut by_kind: BTreeMap<EvalErrorKind, usize> = BTreeMap::new();
        for (_, record) in &outcomes.records {
            if let Some(kind) = record.error_kind() {
                *by_kind.entry(kind).or_insert(0) += 1;
            }
        }

        let total = outcomes.records.len();
        let mut categories = vec![OutcomeCategory {
            category: "Success".to_string(),
            description: "Evaluated successfully".to_string(),
            count: outcomes.counts.succeeded,
            percentage: safe_percentage(outcomes.counts.succeeded, total),
        }];
        categories.extend(EvalErrorKind::ALL.iter().map(|kind| {
            let count = by_kind.get(kind).copied().unwrap_or(0);
            OutcomeCategory {
                category: kind.to_string(),
                description: kind.description().to_string(),
                count,
                percentage: safe_percentage(count, total),
            }
        }));

        ErrorBreakdownReport {
            records: outcomes.counts,
            categories,
        }
    }

    /// Versions come from the corpus `compiler` field, so records whose
    /// address is not in the corpus land under `unknown`
    pub fn analyse_versions(outcomes: &OutcomeSet, corpus: &ContractCorpus) -> VersionReport {
        let mut rows: BTreeMap<(u32, u32), VersionRow> = BTreeMap::new();
        let mut unknown = VersionRow {
            version: UNKNOWN_VERSION.to_string(),
            evaluated: 0,
            succeeded: 0,
        };

        let declared: HashMap<String, SolidityVersion> = corpus
            .records()
            .iter()
            .filter_map(|r| {
                let version = r.compiler.parse::<SolidityVersion>().ok()?;
                Some((r.address.to_ascii_lowercase(), version))
            })
            .collect();

        for (address, record) in &outcomes.records {
            let version = declared.get(&address.to_ascii_lowercase()).copied();

            let row = match version {
                Some(v) => rows.entry((v.major, v.minor)).or_insert_with(|| VersionRow {
                    version: v.minor_key(),
                    evaluated: 0,
                    succeeded: 0,
                }),
                None => &mut unknown,
            };
            row.evaluated += 1;
            if record.is_success() {
                row.succeeded += 1;
            }
        }

        let mut versions: Vec<VersionRow> = rows.into_values().collect();
        if unknown.evaluated > 0 {
            versions.push(unknown);
        }

        VersionReport {
            records: outcomes.counts,
            versions,
        }
    }
}
