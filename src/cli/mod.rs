use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Static gas estimate accuracy evaluator
#[derive(Parser)]
#[command(name = "gas-estimate-eval")]
#[command(about = "Evaluate static gas estimates against on-chain transactions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the primary pass over the contract corpus
    Run(commands::run::RunCommand),
    /// Re-run evaluation for failed records using first-pass estimator output
    Rerun(commands::rerun::RerunCommand),
    /// Aggregate persisted outcome records into a report
    Report(commands::report::ReportCommand),
    /// Print the effective configuration as TOML
    ShowConfig(commands::show_config::ShowConfigCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "info" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(command) => command.run().await,
        Commands::Rerun(command) => command.run().await,
        Commands::Report(command) => command.run(),
        Commands::ShowConfig(command) => command.run(),
    }
}
