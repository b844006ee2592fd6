use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pricefeed::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for pricefeed::AppCommand {
    fn from(cmd: Commands) -> pricefeed::AppCommand {
        match cmd {
            Commands::History => pricefeed::AppCommand::History,
            Commands::Latest => pricefeed::AppCommand::Latest,
            Commands::All => pricefeed::AppCommand::All,
            Commands::Inspect => pricefeed::AppCommand::Inspect,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch history and write daily, monthly and rebased files
    History,
    /// Fetch the latest close of the index symbol
    Latest,
    /// Run history, then latest
    All,
    /// Show the contents of the published files
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pricefeed::cli::setup::run(),
        Some(cmd) => pricefeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
