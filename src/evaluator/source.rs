//! Turning explorer source metadata into compiler inputs

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::explorer::RawSourceMetadata;
use crate::types::outcome::EvalError;
use crate::types::settings::{CompilerSettings, SourceFile};
use crate::utils::version::SolidityVersion;

const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Everything the compiler and estimator need for one contract
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSource {
    pub contract_name: String,
    pub sources: Vec<SourceFile>,
    pub settings: CompilerSettings,
}

/// Validate explorer metadata and derive sources and compiler settings
///
/// `fallback_name` is used when the explorer reports no contract name.
pub fn prepare_source(
    meta: &RawSourceMetadata,
    fallback_name: &str,
    min_version: &SolidityVersion,
) -> Result<PreparedSource, EvalError> {
    let code = meta.source_code.trim();
    if code.is_empty() {
        return Err(EvalError::SourceUnavailable(
            "no verified source code".to_string(),
        ));
    }

    let version: SolidityVersion = meta
        .compiler_version
        .parse()
        .map_err(|e| EvalError::SourceUnavailable(format!("{}", e)))?;
    if version < *min_version {
        return Err(EvalError::SourceUnavailable(format!(
            "compiler {} is older than {}",
            version, min_version
        )));
    }

    let contract_name = if meta.contract_name.trim().is_empty() {
        fallback_name.to_string()
    } else {
        meta.contract_name.trim().to_string()
    };

    let (sources, detail_overrides) = if code.starts_with('{') {
        parse_multi_file(code)?
    } else {
        (
            vec![SourceFile {
                name: format!("{}.sol", contract_name),
                content: meta.source_code.clone(),
            }],
            None,
        )
    };

    let optimizer_runs = match meta.runs.trim() {
        "" => DEFAULT_OPTIMIZER_RUNS,
        runs => runs.parse().map_err(|_| {
            EvalError::SourceUnavailable(format!("invalid optimizer runs: {}", runs))
        })?,
    };

    let settings = CompilerSettings {
        version: meta.compiler_version.trim().to_string(),
        evm_version: meta.evm_version.trim().to_string(),
        optimizer_enabled: meta.optimization_used.trim() == "1",
        optimizer_runs,
        via_ir: false,
        details_enabled: detail_overrides.is_some(),
        details: CompilerSettings::details_with_overrides(&detail_overrides.unwrap_or_default()),
    };

    debug!(
        "Prepared {} source file(s) for {} ({})",
        sources.len(),
        contract_name,
        settings.version
    );

    Ok(PreparedSource {
        contract_name,
        sources,
        settings,
    })
}

type ParsedSources = (Vec<SourceFile>, Option<BTreeMap<String, bool>>);

/// Multi-file sources come as a standard-JSON document, wrapped in an extra
/// pair of braces, or as a bare `{name: {content}}` map
fn parse_multi_file(code: &str) -> Result<ParsedSources, EvalError> {
    let unwrapped = if code.starts_with("{{") && code.ends_with("}}") {
        &code[1..code.len() - 1]
    } else {
        code
    };

    let document: Value = serde_json::from_str(unwrapped).map_err(|e| {
        EvalError::SourceUnavailable(format!("unreadable multi-file source: {}", e))
    })?;

    if let Some(language) = document.get("language").and_then(Value::as_str) {
        if !language.eq_ignore_ascii_case("solidity") {
            return Err(EvalError::SourceUnavailable(format!(
                "unsupported language: {}",
                language
            )));
        }
    }

    let source_map = document
        .get("sources")
        .unwrap_or(&document)
        .as_object()
        .ok_or_else(|| EvalError::SourceUnavailable("multi-file source has no sources".into()))?;

    let sources: Vec<SourceFile> = source_map
        .iter()
        .filter_map(|(name, entry)| {
            entry
                .get("content")
                .and_then(Value::as_str)
                .map(|content| SourceFile {
                    name: name.clone(),
                    content: content.to_string(),
                })
        })
        .collect();
    if sources.is_empty() {
        return Err(EvalError::SourceUnavailable(
            "multi-file source has no sources".to_string(),
        ));
    }

    // Non-boolean entries (e.g. yulDetails) are left to the baseline
    let details = document
        .pointer("/settings/optimizer/details")
        .and_then(Value::as_object)
        .map(|details| {
            details
                .iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                .collect()
        });

    Ok((sources, details))
}
