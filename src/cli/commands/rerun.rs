use super::{build_pipeline, load_config};
use crate::errors::AppResult;
use crate::processor::CorpusOrchestrator;
use crate::store::OutcomeStore;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct RerunCommand {
    /// Pass prefix whose failed records are re-evaluated
    #[arg(long)]
    secondary: String,

    /// Pass prefix holding first-pass estimator output (default: unprefixed results)
    #[arg(long)]
    primary_pass: Option<String>,

    /// Root directory for outcome records (overrides config.toml)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Contracts evaluated at once (overrides config.toml)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Explorer API key (overrides ETHERSCAN_API_KEY and config.toml)
    #[arg(long)]
    api_key: Option<String>,
}

impl RerunCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Gas Estimate Evaluator - Re-evaluation Pass ===");

        let mut config = load_config("the re-evaluation pass")?;

        if let Some(dir) = self.results_dir.clone() {
            config.paths.results_dir = dir;
        }
        if let Some(concurrency) = self.concurrency {
            config.processing.concurrency = concurrency;
        }
        if let Some(key) = self.api_key.clone() {
            config.explorer.api_key = key;
        }

        let primary = OutcomeStore::open(&config.paths.results_dir, self.primary_pass.as_deref())?;
        let secondary =
            OutcomeStore::open(&config.paths.results_dir, Some(self.secondary.as_str()))?;

        let pipeline = build_pipeline(&config)?;
        let orchestrator = CorpusOrchestrator::new(&pipeline, config.processing.clone())?;
        let stats = orchestrator.run_reevaluation(&primary, &secondary).await?;

        info!(
            "Explorer request failures (including retried): {}",
            pipeline.explorer().get_error_count()
        );
        info!(
            "Re-evaluation complete: {} succeeded, {} failed, {} without a reusable estimate",
            stats.succeeded,
            stats.failed_total(),
            stats.skipped_no_estimate
        );
        Ok(())
    }
}
