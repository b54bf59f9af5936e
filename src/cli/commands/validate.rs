//! Validate config command implementation

use crate::cli::commands::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::StoreBackend;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

fn backend_name(backend: StoreBackend) -> &'static str {
    match backend {
        StoreBackend::Memory => "memory",
        StoreBackend::File => "file",
        StoreBackend::PostgreSQL => "postgresql",
    }
}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  IQChart Snapshot: {}",
            config.source.path.as_deref().unwrap_or("(none)")
        );
        println!(
            "  Property Store: {}",
            backend_name(config.properties.backend)
        );
        if config.properties.backend == StoreBackend::File {
            println!("  Properties File: {}", config.properties.path);
        }
        println!("  Target Store: {}", backend_name(config.target.backend));

        if let Some(ref pg_config) = config.postgresql {
            use secrecy::ExposeSecret;
            println!(
                "  PostgreSQL Connection: {}",
                pg_config
                    .connection_string
                    .expose_secret()
                    .as_str()
                    .split('@')
                    .next_back()
                    .unwrap_or("***")
            );
            println!("  Max Connections: {}", pg_config.max_connections);
        }

        println!("  Operator: {}", config.access.username);
        println!("  Poll Interval: {} ms", config.import.poll_interval_ms);
        println!();

        Ok(EXIT_OK)
    }
}
