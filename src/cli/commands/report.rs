use super::load_config;
use crate::analysis::{AggregationEngine, OutputFormat, ReportFormatter};
use crate::errors::AppResult;
use crate::store::OutcomeStore;
use crate::types::contract::ContractCorpus;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which aggregation to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Contract/function accuracy and coverage overview
    Default,
    /// Accuracy per gas class
    Gas,
    /// Contract accuracy per coverage class
    Coverage,
    /// Outcome counts per failure kind
    Errors,
    /// Outcomes per declared compiler minor version
    Version,
}

#[derive(Args)]
pub struct ReportCommand {
    /// Report to produce
    #[arg(value_enum, default_value = "default")]
    kind: ReportKind,

    /// Root directory for outcome records (overrides config.toml)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Read outcomes from <results-dir>/<pass>
    #[arg(long)]
    pass: Option<String>,

    /// Contract corpus, used by the version report (overrides config.toml)
    #[arg(long)]
    corpus_file: Option<PathBuf>,

    /// Output format: console or json
    #[arg(long, default_value = "console")]
    format: String,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = load_config("reporting")?;
        let results_dir = self
            .results_dir
            .clone()
            .unwrap_or(config.paths.results_dir);
        let format: OutputFormat = self.format.parse()?;

        let store = OutcomeStore::open(&results_dir, self.pass.as_deref())?;
        info!("Aggregating outcome records in {}", store.dir().display());
        let engine = AggregationEngine::from_store(&store)?;

        let output = match self.kind {
            ReportKind::Default => {
                ReportFormatter::format_accuracy(&engine.analyse_accuracy(), &format)?
            }
            ReportKind::Gas => {
                ReportFormatter::format_gas_classes(&engine.analyse_gas_classes(), &format)?
            }
            ReportKind::Coverage => {
                ReportFormatter::format_coverage(&engine.analyse_coverage(), &format)?
            }
            ReportKind::Errors => {
                ReportFormatter::format_errors(&engine.analyse_errors(), &format)?
            }
            ReportKind::Version => {
                let corpus_file = self
                    .corpus_file
                    .clone()
                    .unwrap_or(config.paths.corpus_file);
                let corpus = ContractCorpus::load(&corpus_file)?;
                ReportFormatter::format_versions(&engine.analyse_versions(&corpus), &format)?
            }
        };

        match &self.output {
            Some(path) => write_output_to_file(path, &output, "Report")?,
            None => print!("{}", output),
        }
        Ok(())
    }
}

/// Write output to file with safe directory creation
fn write_output_to_file(path: &Path, content: &str, description: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("{} written to: {}", description, path.display());
    Ok(())
}
