//! External tool adapters
//!
//! - **Compiler** - per-version `solc` binaries in standard-JSON mode
//! - **SymExec** - symbolic gas estimator speaking JSON over stdin/stdout
//!
//! Both adapters own their wall-clock timeouts. Failures are reported as
//! plain messages; the evaluation pipeline maps them onto its failure taxonomy.

pub mod compiler;
pub mod symexec;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::types::accuracy::SymExecOutput;
use crate::types::settings::{CompilerSettings, SourceFile, SymExecSettings};

pub use compiler::SolcCompiler;
pub use symexec::CommandEstimator;

/// Source + settings to compiled artifact
#[allow(async_fn_in_trait)]
pub trait Compiler {
    async fn compile(
        &self,
        sources: &[SourceFile],
        settings: &CompilerSettings,
    ) -> Result<serde_json::Value, String>;
}

/// Compiled artifact to per-function gas estimates and coverage
#[allow(async_fn_in_trait)]
pub trait SymbolicEstimator {
    async fn symbolic_execute(
        &self,
        sources: &[SourceFile],
        contract_name: &str,
        artifact: &serde_json::Value,
        settings: &SymExecSettings,
    ) -> Result<SymExecOutput, String>;
}

/// Run `program args...`, feed `input` on stdin and return stdout
///
/// The child is killed if the timeout elapses. A non-zero exit status is an
/// error carrying the tail of stderr.
pub(crate) async fn run_with_stdin(
    program: &Path,
    args: &[String],
    input: &[u8],
    timeout_seconds: u64,
) -> Result<Vec<u8>, String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("failed to start {}: {}", program.display(), e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .await
            .map_err(|e| format!("failed to write to {}: {}", program.display(), e))?;
    }

    let output = timeout(Duration::from_secs(timeout_seconds), child.wait_with_output())
        .await
        .map_err(|_| format!("{} timed out after {}s", program.display(), timeout_seconds))?
        .map_err(|e| format!("failed waiting for {}: {}", program.display(), e))?;

    debug!(
        "{} exited with {} ({} bytes of output)",
        program.display(),
        output.status,
        output.stdout.len()
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.trim().lines().collect();
        let tail = lines[lines.len().saturating_sub(5)..].join(" | ");
        return Err(format!("{} exited with {}: {}", program.display(), output.status, tail));
    }

    Ok(output.stdout)
}
