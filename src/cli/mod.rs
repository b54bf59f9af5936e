//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for IQBridge using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// IQBridge - IQChart to OpenMRS import bridge
#[derive(Parser, Debug)]
#[command(name = "iqbridge")]
#[command(version, about, long_about = None)]
#[command(author = "IQBridge Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "iqbridge.toml", env = "IQBRIDGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "IQBRIDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show or change the entity mappings
    Mappings(commands::mappings::MappingsArgs),

    /// Translate every IQChart patient without writing
    Preview(commands::preview::PreviewArgs),

    /// Show how one patient would be imported
    Patient(commands::patient::PatientArgs),

    /// Import every IQChart patient into the target
    Import(commands::import::ImportArgs),
}

impl Commands {
    /// Whether the command runs before a configuration file exists
    pub fn needs_config(&self) -> bool {
        !matches!(self, Commands::Init(_))
    }
}
