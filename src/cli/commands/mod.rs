pub mod report;
pub mod rerun;
pub mod run;
pub mod show_config;

use crate::adapters::compiler::SolcCompiler;
use crate::adapters::symexec::CommandEstimator;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::evaluator::{AccuracyEvaluator, ContractPipeline};
use crate::explorer::ExplorerClient;
use crate::utils::version::SolidityVersion;
use tracing::{info, warn};

/// Pipeline wired to the real explorer, compiler and estimator
pub type LivePipeline = ContractPipeline<ExplorerClient, SolcCompiler, CommandEstimator>;

/// Load config.toml/environment, falling back to defaults
pub(crate) fn load_config(command: &str) -> AppResult<AppConfig> {
    match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            Ok(config)
        }
        Err(e) => {
            warn!("Failed to load configuration: {}", e);
            info!("Using defaults and CLI arguments for {}", command);
            AppConfig::get_defaults().map_err(|e| AppError::Config(e.to_string()))
        }
    }
}

pub(crate) fn build_pipeline(config: &AppConfig) -> AppResult<LivePipeline> {
    let min_version: SolidityVersion = config.processing.min_compiler_version.parse()?;
    let explorer = ExplorerClient::new(config.explorer.clone())?;
    let compiler = SolcCompiler::new(&config.compiler);
    let estimator = CommandEstimator::new(&config.symexec);
    let evaluator = AccuracyEvaluator::new(config.evaluation.clone());

    info!("Explorer: {}", config.explorer.url);
    info!("Compiler binaries: {}", config.compiler.solc_dir.display());
    info!("Estimator command: {}", config.symexec.command.display());
    info!("Minimum compiler version: {}", min_version);

    Ok(ContractPipeline::new(
        explorer,
        compiler,
        estimator,
        evaluator,
        config.symexec.clone(),
        min_version,
    ))
}
