//! CLI application for sorting brokerage confirmation PDFs.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use belegsort_core::LogLevel;
use commands::{config, inspect, sort};

/// Rename brokerage confirmations into date_broker_ISIN_number_kind.pdf
#[derive(Parser)]
#[command(name = "belegsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (overrides the configured log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy confirmations from the sources into the target directory under normalized names
    Sort(sort::SortArgs),

    /// Show what would be extracted from a single file
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn level_for(verbose: u8, configured: Option<LogLevel>) -> Level {
    match (verbose, configured) {
        (0, Some(LogLevel::Error)) => Level::ERROR,
        (0, Some(LogLevel::Info)) => Level::INFO,
        (0, Some(LogLevel::Debug)) => Level::DEBUG,
        (0, None) => Level::WARN,
        (1, _) => Level::INFO,
        (2, _) => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An invalid level is reported by the command that needs the config.
    let configured = commands::load_config(cli.config.as_deref())
        .ok()
        .and_then(|c| c.log_level().ok());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(cli.verbose, configured))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Sort(args) => sort::run(args, cli.config.as_deref()).await,
        Commands::Inspect(args) => inspect::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for(0, Some(LogLevel::Error)), Level::ERROR);
        assert_eq!(level_for(0, None), Level::WARN);
        assert_eq!(level_for(1, Some(LogLevel::Error)), Level::INFO);
        assert_eq!(level_for(3, None), Level::TRACE);
    }
}
