//! Symbolic gas estimation through an external command
//!
//! The command receives one JSON request on stdin and answers with
//! `{"success": bool, "result": ...}` on stdout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::{run_with_stdin, SymbolicEstimator};
use crate::config::SymExecConfig;
use crate::types::accuracy::SymExecOutput;
use crate::types::settings::{SourceFile, SymExecSettings};

#[derive(Debug, Serialize)]
struct EstimatorRequest<'a> {
    sources: &'a [SourceFile],
    contract_name: &'a str,
    compiled: &'a serde_json::Value,
    settings: &'a SymExecSettings,
}

#[derive(Debug, Deserialize)]
struct EstimatorResponse {
    success: bool,
    #[serde(default)]
    result: serde_json::Value,
}

pub struct CommandEstimator {
    command: PathBuf,
    args: Vec<String>,
    timeout_seconds: u64,
}

impl CommandEstimator {
    pub fn new(config: &SymExecConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// Interpret the estimator's response envelope
fn parse_response(stdout: &[u8]) -> Result<SymExecOutput, String> {
    let response: EstimatorResponse = serde_json::from_slice(stdout)
        .map_err(|e| format!("unreadable estimator output: {}", e))?;

    if !response.success {
        let message = match response.result {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => "estimator reported failure".to_string(),
            other => other.to_string(),
        };
        return Err(message);
    }

    serde_json::from_value(response.result)
        .map_err(|e| format!("malformed estimator result: {}", e))
}

impl SymbolicEstimator for CommandEstimator {
    async fn symbolic_execute(
        &self,
        sources: &[SourceFile],
        contract_name: &str,
        artifact: &serde_json::Value,
        settings: &SymExecSettings,
    ) -> Result<SymExecOutput, String> {
        let request = EstimatorRequest {
            sources,
            contract_name,
            compiled: artifact,
            settings,
        };
        let input = serde_json::to_vec(&request)
            .map_err(|e| format!("failed to encode estimator request: {}", e))?;

        debug!(
            "Running symbolic estimator on {} (strategy {}, depth {})",
            contract_name, settings.strategy, settings.max_depth
        );
        let stdout =
            run_with_stdin(&self.command, &self.args, &input, self.timeout_seconds).await?;
        parse_response(&stdout)
    }
}
