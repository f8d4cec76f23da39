use super::{build_pipeline, load_config};
use crate::errors::AppResult;
use crate::processor::CorpusOrchestrator;
use crate::store::OutcomeStore;
use crate::types::contract::ContractCorpus;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct RunCommand {
    /// Line-delimited JSON contract corpus (overrides config.toml)
    #[arg(long)]
    corpus_file: Option<PathBuf>,

    /// Root directory for outcome records (overrides config.toml)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Write outcomes under <results-dir>/<pass> instead of <results-dir>
    #[arg(long)]
    pass: Option<String>,

    /// Contracts evaluated at once (overrides config.toml)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Skip contracts with fewer transactions (overrides config.toml)
    #[arg(long)]
    min_tx_count: Option<u64>,

    /// Progress report interval (contracts) (overrides config.toml)
    #[arg(long)]
    progress_interval: Option<usize>,

    /// Explorer API key (overrides ETHERSCAN_API_KEY and config.toml)
    #[arg(long)]
    api_key: Option<String>,
}

impl RunCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Gas Estimate Evaluator - Primary Pass ===");

        let mut config = load_config("the primary pass")?;

        // CLI arguments override config values
        if let Some(path) = self.corpus_file.clone() {
            config.paths.corpus_file = path;
        }
        if let Some(dir) = self.results_dir.clone() {
            config.paths.results_dir = dir;
        }
        if let Some(concurrency) = self.concurrency {
            config.processing.concurrency = concurrency;
        }
        if let Some(min) = self.min_tx_count {
            config.processing.min_tx_count = min;
        }
        if let Some(interval) = self.progress_interval {
            config.processing.progress_interval = interval;
        }
        if let Some(key) = self.api_key.clone() {
            config.explorer.api_key = key;
        }

        info!("Configuration:");
        info!("  Corpus: {}", config.paths.corpus_file.display());
        info!("  Results: {}", config.paths.results_dir.display());
        info!("  Pass: {}", self.pass.as_deref().unwrap_or("(none)"));
        info!(
            "  Pages: {} (min samples {}, hard limit {})",
            config.evaluation.max_pages,
            config.evaluation.min_samples,
            config.evaluation.page_hard_limit
        );

        let corpus = ContractCorpus::load(&config.paths.corpus_file)?;
        if corpus.is_empty() {
            warn!("Corpus {} is empty", config.paths.corpus_file.display());
        }
        let store = OutcomeStore::open(&config.paths.results_dir, self.pass.as_deref())?;

        let pipeline = build_pipeline(&config)?;
        let orchestrator = CorpusOrchestrator::new(&pipeline, config.processing.clone())?;
        let stats = orchestrator.run_primary(&corpus, &store).await?;

        info!(
            "Explorer request failures (including retried): {}",
            pipeline.explorer().get_error_count()
        );
        info!(
            "Primary pass complete: {} succeeded, {} failed, {:.1}% success rate",
            stats.succeeded,
            stats.failed_total(),
            stats.success_rate()
        );
        Ok(())
    }
}
