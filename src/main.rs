// IQBridge - IQChart to OpenMRS import bridge
// Copyright (c) 2025 IQBridge Contributors
// Licensed under the MIT License

use clap::Parser;
use iqbridge::cli::commands::EXIT_FATAL;
use iqbridge::cli::{Cli, Commands};
use iqbridge::config::{load_config, LoggingConfig};
use iqbridge::logging::{init_logging, LoggingGuard};
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "IQBridge - IQChart to OpenMRS import bridge"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush buffered file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Console logging always; file logging when the configuration asks for it
/// and the log directory is usable
fn setup_logging(cli: &Cli) -> iqbridge::domain::Result<LoggingGuard> {
    let console_only = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };

    let config = cli
        .command
        .needs_config()
        .then(|| load_config(&cli.config).ok())
        .flatten();

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let logging = match config {
        Some(ref c) if c.logging.local_enabled => {
            if let Err(e) = std::fs::create_dir_all(&c.logging.local_path) {
                eprintln!(
                    "Warning: file logging disabled, cannot use {}: {e}",
                    c.logging.local_path
                );
                &console_only
            } else {
                &c.logging
            }
        }
        _ => &console_only,
    };

    init_logging(&log_level, logging)
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Mappings(args) => args.execute(&cli.config).await,
        Commands::Preview(args) => args.execute(&cli.config).await,
        Commands::Patient(args) => args.execute(&cli.config).await,
        Commands::Import(args) => args.execute(&cli.config).await,
    }
}
