//! Solidity compilation through per-version `solc` binaries

use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::debug;

use super::{run_with_stdin, Compiler};
use crate::config::CompilerConfig;
use crate::types::settings::{CompilerSettings, SourceFile};
use crate::utils::version::is_release_identifier;

const BINARY_PREFIX: &str = "solc-linux-amd64-";

/// Invokes `<solc_dir>/solc-linux-amd64-<version> --standard-json`
pub struct SolcCompiler {
    solc_dir: PathBuf,
    timeout_seconds: u64,
}

impl SolcCompiler {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            solc_dir: config.solc_dir.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Resolve the binary for a release identifier
    ///
    /// Only well-formed identifiers are spliced into the file name, and the
    /// binary must already exist.
    pub fn binary_for(&self, version: &str) -> Result<PathBuf, String> {
        if !is_release_identifier(version) {
            return Err(format!("invalid compiler version identifier: {}", version));
        }
        let binary = self.solc_dir.join(format!("{}{}", BINARY_PREFIX, version));
        if !binary.is_file() {
            return Err(format!("compiler binary not installed: {}", binary.display()));
        }
        Ok(binary)
    }
}

/// Standard-JSON input document
pub fn standard_json_input(sources: &[SourceFile], settings: &CompilerSettings) -> Value {
    let sources: serde_json::Map<String, Value> = sources
        .iter()
        .map(|s| (s.name.clone(), json!({ "content": s.content })))
        .collect();
    json!({
        "language": "Solidity",
        "sources": sources,
        "settings": settings.to_solc_settings(),
    })
}

/// Messages of every diagnostic with severity `error`
pub fn compiler_errors(output: &Value) -> Vec<String> {
    output
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter(|e| e.get("severity").and_then(Value::as_str) == Some("error"))
                .map(|e| {
                    e.get("formattedMessage")
                        .or_else(|| e.get("message"))
                        .and_then(Value::as_str)
                        .unwrap_or("unknown compiler error")
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Compiler for SolcCompiler {
    async fn compile(
        &self,
        sources: &[SourceFile],
        settings: &CompilerSettings,
    ) -> Result<Value, String> {
        let binary = self.binary_for(&settings.version)?;
        let input = serde_json::to_vec(&standard_json_input(sources, settings))
            .map_err(|e| format!("failed to encode compiler input: {}", e))?;

        debug!(
            "Compiling {} source file(s) with {}",
            sources.len(),
            settings.version
        );
        let stdout = run_with_stdin(
            &binary,
            &["--standard-json".to_string()],
            &input,
            self.timeout_seconds,
        )
        .await?;

        let output: Value = serde_json::from_slice(&stdout)
            .map_err(|e| format!("unreadable compiler output: {}", e))?;

        let errors = compiler_errors(&output);
        if !errors.is_empty() {
            return Err(errors.join("\n"));
        }
        Ok(output)
    }
}
