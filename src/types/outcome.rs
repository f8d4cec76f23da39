//! Per-contract evaluation outcomes and the closed failure taxonomy
//!
//! An [`OutcomeRecord`] is the durable unit of work: exactly one per contract,
//! keyed by address. Its on-disk form is
//! `{"status": 0|1, "result": EvalResult | {kind, message}, "traceback"?}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::accuracy::{AccuracySummary, SymExecOutput};

/// Successful evaluation of one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub summary: AccuracySummary,
    pub functions: BTreeMap<String, AccuracySummary>,
    /// Keyed by gas class slot; overflow is `GAS_CLASSES.len()`
    pub gas_class: BTreeMap<usize, AccuracySummary>,
    /// Raw estimator output, kept so evaluation can be re-run on its own
    pub symexec_result: SymExecOutput,
}

/// Closed set of contract-level failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvalErrorKind {
    SourceUnavailable,
    CompilationFailed,
    SymbolicExecutionFailed,
    NoMatchingTransactions,
    Unexpected,
}

impl EvalErrorKind {
    pub const ALL: [EvalErrorKind; 5] = [
        EvalErrorKind::SourceUnavailable,
        EvalErrorKind::CompilationFailed,
        EvalErrorKind::SymbolicExecutionFailed,
        EvalErrorKind::NoMatchingTransactions,
        EvalErrorKind::Unexpected,
    ];

    /// Human-readable category used by the error breakdown report
    pub fn description(&self) -> &'static str {
        match self {
            EvalErrorKind::SourceUnavailable => "Solidity version too low or explorer API error",
            EvalErrorKind::CompilationFailed => "Compilation failed",
            EvalErrorKind::SymbolicExecutionFailed => "Symbolic execution failed",
            EvalErrorKind::NoMatchingTransactions => "Not enough concrete transactions",
            EvalErrorKind::Unexpected => "Other errors",
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvalErrorKind::SourceUnavailable => "SourceUnavailable",
            EvalErrorKind::CompilationFailed => "CompilationFailed",
            EvalErrorKind::SymbolicExecutionFailed => "SymbolicExecutionFailed",
            EvalErrorKind::NoMatchingTransactions => "NoMatchingTransactions",
            EvalErrorKind::Unexpected => "Unexpected",
        };
        write!(f, "{}", name)
    }
}

/// Contract-level failure returned by the per-contract pipeline
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Compilation failed: {0}")]
    CompilationFailed(String),

    #[error("Symbolic execution failed: {0}")]
    SymbolicExecutionFailed(String),

    #[error("No matching transactions")]
    NoMatchingTransactions,

    /// Anything outside the taxonomy; `trace` holds the full diagnostic capture
    #[error("Unexpected error: {message}")]
    Unexpected { message: String, trace: String },
}

impl EvalError {
    /// Wrap an arbitrary error, capturing its cause chain and a backtrace
    pub fn unexpected<E>(err: E) -> Self
    where
        E: std::error::Error,
    {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str(&format!("\nCaused by: {}", cause));
            source = cause.source();
        }
        trace.push_str(&format!(
            "\n\nBacktrace:\n{}",
            std::backtrace::Backtrace::force_capture()
        ));
        EvalError::Unexpected {
            message: err.to_string(),
            trace,
        }
    }

    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::SourceUnavailable(_) => EvalErrorKind::SourceUnavailable,
            EvalError::CompilationFailed(_) => EvalErrorKind::CompilationFailed,
            EvalError::SymbolicExecutionFailed(_) => EvalErrorKind::SymbolicExecutionFailed,
            EvalError::NoMatchingTransactions => EvalErrorKind::NoMatchingTransactions,
            EvalError::Unexpected { .. } => EvalErrorKind::Unexpected,
        }
    }

    pub fn trace(&self) -> Option<&str> {
        match self {
            EvalError::Unexpected { trace, .. } => Some(trace),
            _ => None,
        }
    }
}

/// Outcome status flag, persisted as `0` / `1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OutcomeStatus {
    Failure,
    Success,
}

impl From<OutcomeStatus> for u8 {
    fn from(status: OutcomeStatus) -> u8 {
        match status {
            OutcomeStatus::Failure => 0,
            OutcomeStatus::Success => 1,
        }
    }
}

impl TryFrom<u8> for OutcomeStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OutcomeStatus::Failure),
            1 => Ok(OutcomeStatus::Success),
            other => Err(format!("invalid outcome status {}", other)),
        }
    }
}

/// Failure payload: the short kind used for tallying plus a readable marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: EvalErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomePayload {
    Success(Box<EvalResult>),
    Failure(ErrorDescriptor),
}

/// Durable per-contract outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOutcomeRecord")]
pub struct OutcomeRecord {
    pub status: OutcomeStatus,
    pub result: OutcomePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<DateTime<Utc>>,
}

/// On-disk shape before the payload is interpreted according to `status`
#[derive(Deserialize)]
struct RawOutcomeRecord {
    status: OutcomeStatus,
    result: serde_json::Value,
    #[serde(default)]
    traceback: Option<String>,
    #[serde(default)]
    evaluated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawOutcomeRecord> for OutcomeRecord {
    type Error = serde_json::Error;

    fn try_from(raw: RawOutcomeRecord) -> Result<Self, Self::Error> {
        let result = match raw.status {
            OutcomeStatus::Success => OutcomePayload::Success(serde_json::from_value(raw.result)?),
            OutcomeStatus::Failure => OutcomePayload::Failure(serde_json::from_value(raw.result)?),
        };
        Ok(Self {
            status: raw.status,
            result,
            traceback: raw.traceback,
            evaluated_at: raw.evaluated_at,
        })
    }
}

impl OutcomeRecord {
    pub fn success(result: EvalResult) -> Self {
        Self {
            status: OutcomeStatus::Success,
            result: OutcomePayload::Success(Box::new(result)),
            traceback: None,
            evaluated_at: Some(Utc::now()),
        }
    }

    pub fn failure(error: &EvalError) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            result: OutcomePayload::Failure(ErrorDescriptor {
                kind: error.kind(),
                message: error.to_string(),
            }),
            traceback: error.trace().map(str::to_string),
            evaluated_at: Some(Utc::now()),
        }
    }

    pub fn from_result(result: Result<EvalResult, EvalError>) -> Self {
        match result {
            Ok(eval) => Self::success(eval),
            Err(e) => Self::failure(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Evaluation payload of a successful record
    pub fn eval_result(&self) -> Option<&EvalResult> {
        match (&self.status, &self.result) {
            (OutcomeStatus::Success, OutcomePayload::Success(result)) => Some(result),
            _ => None,
        }
    }

    /// Failure kind of a failed record
    pub fn error_kind(&self) -> Option<EvalErrorKind> {
        match &self.result {
            OutcomePayload::Failure(descriptor) => Some(descriptor.kind),
            OutcomePayload::Success(_) => None,
        }
    }
}

/// Why a contract was not evaluated in a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// A committed record (or a live claim) already exists
    AlreadyProcessed,
    /// Fewer transactions than the configured minimum
    LowSignal,
    /// Re-evaluation only: no successful first-pass record to reuse
    NoReusableEstimate,
}

/// Terminal state of one contract within a pass
#[derive(Debug, Clone, PartialEq)]
pub enum ContractState {
    Skipped(SkipReason),
    Succeeded,
    Failed(EvalErrorKind),
}
