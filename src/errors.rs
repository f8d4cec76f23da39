use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Blockchain explorer operations
    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Outcome store errors (claims, commits, scans)
    #[error("Outcome store error: {0}")]
    Store(String),

    /// Invalid corpus record
    #[error("Invalid contract record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Blockchain explorer error types
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// HTTP request could not be sent or the connection dropped
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Explorer answered with a non-success HTTP status
    #[error("HTTP status {status} for {action}")]
    HttpStatus { status: u16, action: String },

    /// Explorer answered 200 but flagged the call as an error (rate limits, bad key)
    #[error("API error for {action}: {message}")]
    Api { action: String, message: String },

    /// Failed to deserialise explorer response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// Retry limit exceeded for an explorer call
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// Request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// The explorer has no verified source for this address
    #[error("No verified source for {address}")]
    SourceNotVerified { address: String },
}

impl ExplorerError {
    /// Whether a later attempt of the same call can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ExplorerError::RequestFailed(_)
            | ExplorerError::Timeout { .. }
            | ExplorerError::Api { .. } => true,
            ExplorerError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ExplorerError::DeserialisationFailed(_)
            | ExplorerError::MaxRetriesExceeded { .. }
            | ExplorerError::SourceNotVerified { .. } => false,
        }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for explorer operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Config(format!("Glob pattern error: {}", err))
    }
}

impl From<glob::GlobError> for AppError {
    fn from(err: glob::GlobError) -> Self {
        AppError::Store(format!("Glob error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExplorerError::DeserialisationFailed(err.to_string())
        } else {
            ExplorerError::RequestFailed(err.to_string())
        }
    }
}
