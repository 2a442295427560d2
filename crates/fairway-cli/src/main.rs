//! Fairway CLI - Main entry point

use clap::Parser;
use fairway_cli::{commands, Cli, Commands};
use fairway_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Load .env before clap resolves env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("fairway-cli".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("fairway-cli".to_string())
            .build()
    };

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as CLI should work without logging)
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> fairway_cli::Result<()> {
    let database_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Sync { url, file } => commands::sync::run(database_url, url, file).await,
        Commands::Seed { file, yes } => commands::seed::run(database_url, file, yes).await,
        Commands::List => commands::locations::list(database_url).await,
        Commands::Show { slug } => commands::locations::show(database_url, &slug).await,
    }
}
