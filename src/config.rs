use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::classification::GasClassBasis;
use crate::types::settings::SearchStrategy;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub explorer: ExplorerConfig,
    pub evaluation: EvaluationConfig,
    pub processing: ProcessingConfig,
    pub compiler: CompilerConfig,
    pub symexec: SymExecConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Line-delimited JSON corpus of candidate contracts
    pub corpus_file: PathBuf,
    /// Root directory for outcome records
    pub results_dir: PathBuf,
}

/// Etherscan-compatible explorer API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
    /// Minimum spacing between two requests (free-tier rate limit)
    pub min_request_interval_ms: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            url: "https://api.etherscan.io/api".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            max_retries: 5,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 30,
            min_request_interval_ms: 200,
        }
    }
}

/// Accuracy evaluation budget and classification policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Pages to fetch before the sample minimum alone may end paging
    pub max_pages: u32,
    /// Matched samples required before the page budget alone may end paging
    pub min_samples: usize,
    /// Per-function sample cap
    pub max_samples_per_function: usize,
    /// Transactions requested per page
    pub page_size: u32,
    /// Absolute page ceiling for feeds that never exhaust
    pub page_hard_limit: u32,
    /// Quantity used to pick a transaction's gas class
    pub gas_class_basis: GasClassBasis,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            min_samples: 50,
            max_samples_per_function: 30,
            page_size: 1000,
            page_hard_limit: 100,
            gas_class_basis: GasClassBasis::Observed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Contracts with fewer transactions are skipped as low-signal
    pub min_tx_count: u64,
    /// Oldest compiler release accepted from explorer metadata
    pub min_compiler_version: String,
    /// Contracts processed at once (1 = strictly sequential)
    pub concurrency: usize,
    /// Emit a progress line every N contracts
    pub progress_interval: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_tx_count: 50,
            min_compiler_version: "0.4.18".to_string(),
            concurrency: 1,
            progress_interval: 25,
        }
    }
}

/// Solidity compiler adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directory holding `solc-linux-amd64-<version>` binaries
    pub solc_dir: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_dir: PathBuf::from("./solc"),
            timeout_seconds: 120,
        }
    }
}

/// Symbolic estimator adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymExecConfig {
    /// Estimator executable speaking JSON over stdin/stdout
    pub command: PathBuf,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
    pub max_depth: u32,
    pub call_depth_limit: u32,
    pub strategy: SearchStrategy,
    pub loop_bound: u32,
    pub transaction_count: u32,
    pub ignore_constraints: bool,
}

impl Default for SymExecConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("symexec"),
            args: Vec::new(),
            timeout_seconds: 900,
            max_depth: 64,
            call_depth_limit: 16,
            strategy: SearchStrategy::Bfs,
            loop_bound: 10,
            transaction_count: 2,
            ignore_constraints: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let explorer = ExplorerConfig::default();
        let evaluation = EvaluationConfig::default();
        let processing = ProcessingConfig::default();
        let compiler = CompilerConfig::default();
        let symexec = SymExecConfig::default();

        let config = Config::builder()
            .set_default("paths.corpus_file", "./contracts.json")?
            .set_default("paths.results_dir", "./eval/contracts")?
            // Explorer defaults
            .set_default("explorer.url", explorer.url)?
            .set_default("explorer.api_key", explorer.api_key)?
            .set_default("explorer.timeout_seconds", explorer.timeout_seconds)?
            .set_default("explorer.max_retries", explorer.max_retries as i64)?
            .set_default("explorer.initial_backoff_ms", explorer.initial_backoff_ms)?
            .set_default("explorer.backoff_multiplier", explorer.backoff_multiplier)?
            .set_default("explorer.max_backoff_seconds", explorer.max_backoff_seconds)?
            .set_default(
                "explorer.min_request_interval_ms",
                explorer.min_request_interval_ms,
            )?
            // Evaluation defaults
            .set_default("evaluation.max_pages", evaluation.max_pages as i64)?
            .set_default("evaluation.min_samples", evaluation.min_samples as i64)?
            .set_default(
                "evaluation.max_samples_per_function",
                evaluation.max_samples_per_function as i64,
            )?
            .set_default("evaluation.page_size", evaluation.page_size as i64)?
            .set_default("evaluation.page_hard_limit", evaluation.page_hard_limit as i64)?
            .set_default("evaluation.gas_class_basis", "observed")?
            // Processing defaults
            .set_default("processing.min_tx_count", processing.min_tx_count)?
            .set_default(
                "processing.min_compiler_version",
                processing.min_compiler_version,
            )?
            .set_default("processing.concurrency", processing.concurrency as i64)?
            .set_default(
                "processing.progress_interval",
                processing.progress_interval as i64,
            )?
            // Adapter defaults
            .set_default(
                "compiler.solc_dir",
                compiler.solc_dir.to_string_lossy().to_string(),
            )?
            .set_default("compiler.timeout_seconds", compiler.timeout_seconds)?
            .set_default(
                "symexec.command",
                symexec.command.to_string_lossy().to_string(),
            )?
            .set_default("symexec.args", Vec::<String>::new())?
            .set_default("symexec.timeout_seconds", symexec.timeout_seconds)?
            .set_default("symexec.max_depth", symexec.max_depth as i64)?
            .set_default("symexec.call_depth_limit", symexec.call_depth_limit as i64)?
            .set_default("symexec.strategy", "bfs")?
            .set_default("symexec.loop_bound", symexec.loop_bound as i64)?
            .set_default("symexec.transaction_count", symexec.transaction_count as i64)?
            .set_default("symexec.ignore_constraints", symexec.ignore_constraints)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // GASEVAL__EXPLORER__URL style overrides
            .add_source(
                config::Environment::with_prefix("GASEVAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // The conventional key variable wins over everything else
        if let Ok(api_key) = env::var("ETHERSCAN_API_KEY") {
            app_config.explorer.api_key = api_key;
        }

        if app_config.processing.concurrency == 0 {
            return Err(ConfigError::Message(
                "processing.concurrency must be at least 1".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self {
                paths: PathsConfig {
                    corpus_file: PathBuf::from("./contracts.json"),
                    results_dir: PathBuf::from("./eval/contracts"),
                },
                explorer: ExplorerConfig::default(),
                evaluation: EvaluationConfig::default(),
                processing: ProcessingConfig::default(),
                compiler: CompilerConfig::default(),
                symexec: SymExecConfig::default(),
            }),
        }
    }
}
