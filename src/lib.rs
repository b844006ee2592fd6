pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Daily, monthly and rebased history files
    History,
    /// Single latest-price record
    Latest,
    /// History followed by latest
    All,
    /// Print the published files
    Inspect,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!(?command, "pricefeed starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Inspect => cli::inspect::run(&config)?,
        AppCommand::History => {
            let provider = providers::YahooFinanceProvider::new(config.yahoo_base_url())?;
            cli::history::run(&config, &provider).await?;
        }
        AppCommand::Latest => {
            let provider = providers::YahooFinanceProvider::new(config.yahoo_base_url())?;
            cli::latest::run(&config, &provider).await?;
        }
        AppCommand::All => {
            let provider = providers::YahooFinanceProvider::new(config.yahoo_base_url())?;
            cli::history::run(&config, &provider).await?;
            cli::latest::run(&config, &provider).await?;
        }
    }
    Ok(())
}
