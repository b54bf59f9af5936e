//! Configuration management for IQBridge.
//!
//! IQBridge reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `IQBRIDGE_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iqbridge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("iqbridge.toml")?;
//!
//! if let Some(path) = &config.source.path {
//!     println!("IQChart snapshot: {}", path);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! dry_run = false
//!
//! [source]
//! path = "/var/lib/iqbridge/iqchart.json"
//!
//! [properties]
//! backend = "postgresql"
//!
//! [target]
//! backend = "postgresql"
//!
//! [postgresql]
//! connection_string = "${IQBRIDGE_PG_URL}"
//! max_connections = 10
//!
//! [access]
//! username = "admin"
//! roles = ["System Developer"]
//! ```
//!
//! Mapping values (identifier type, programs, drug table, ...) are not part of
//! this file. They live in the property store; see
//! [`crate::core::mappings`].

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AccessConfig, ApplicationConfig, BridgeConfig, ImportConfig, LoggingConfig, PostgreSQLConfig,
    PropertiesConfig, SourceConfig, StoreBackend, TargetConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
