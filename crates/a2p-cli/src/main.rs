//! a2p - Main entry point

use a2p_cli::{commands, Cli, Commands, Settings};
use a2p_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env values are visible to clap's env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("a2p")
        .build();

    // LOG_* variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // the CLI works without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> a2p_cli::Result<()> {
    if let Commands::Init { path, force } = &cli.command {
        return commands::init::run(path, *force);
    }

    let settings = Settings::from_env()?.with_overrides(cli.concurrency, cli.mock);

    match &cli.command {
        Commands::Register { input, output } => {
            commands::register::run(&settings, input, output).await?;
        }
        Commands::Resume { file } => {
            commands::resume::run(&settings, file).await?;
        }
        Commands::Refresh { file } => {
            commands::refresh::run(&settings, file).await?;
        }
        Commands::AttachNumbers { file } => {
            commands::attach::run(&settings, file).await?;
        }
        Commands::Update { input, output } => {
            commands::update::run(&settings, input, output).await?;
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}
