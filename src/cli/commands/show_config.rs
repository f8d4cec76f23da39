use super::load_config;
use crate::errors::{AppError, AppResult};
use clap::Args;

#[derive(Args)]
pub struct ShowConfigCommand {
    /// Print the explorer API key instead of masking it
    #[arg(long)]
    reveal_secrets: bool,
}

impl ShowConfigCommand {
    pub fn run(&self) -> AppResult<()> {
        let mut config = load_config("show-config")?;
        if !self.reveal_secrets && !config.explorer.api_key.is_empty() {
            config.explorer.api_key = "********".to_string();
        }
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| AppError::Config(format!("Cannot render configuration: {}", e)))?;
        print!("{}", rendered);
        Ok(())
    }
}
