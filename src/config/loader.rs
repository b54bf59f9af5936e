//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BridgeConfig, PostgreSQLConfig, StoreBackend};
use crate::config::secret_string;
use crate::domain::errors::BridgeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BridgeConfig
/// 4. Applies environment variable overrides (IQBRIDGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `BridgeError::Configuration` if the file cannot be read or parsed,
/// a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use iqbridge::config::loader::load_config;
///
/// let config = load_config("iqbridge.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BridgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BridgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same as [`load_config`], minus the file access.
pub fn parse_config(contents: &str) -> Result<BridgeConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| BridgeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BridgeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BridgeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BridgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_backend(var: &str, val: &str) -> Result<StoreBackend> {
    match val.to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "file" => Ok(StoreBackend::File),
        "postgresql" => Ok(StoreBackend::PostgreSQL),
        other => Err(BridgeError::Configuration(format!(
            "Invalid {var} '{other}'. Must be one of: memory, file, postgresql"
        ))),
    }
}

/// Applies environment variable overrides using the IQBRIDGE_* prefix
///
/// Variables follow the pattern IQBRIDGE_<SECTION>_<KEY>, for example
/// IQBRIDGE_SOURCE_PATH or IQBRIDGE_POSTGRESQL_CONNECTION_STRING.
fn apply_env_overrides(config: &mut BridgeConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("IQBRIDGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("IQBRIDGE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source overrides
    if let Ok(val) = std::env::var("IQBRIDGE_SOURCE_PATH") {
        config.source.path = Some(val);
    }

    // Store overrides
    if let Ok(val) = std::env::var("IQBRIDGE_PROPERTIES_BACKEND") {
        config.properties.backend = parse_backend("IQBRIDGE_PROPERTIES_BACKEND", &val)?;
    }
    if let Ok(val) = std::env::var("IQBRIDGE_PROPERTIES_PATH") {
        config.properties.path = val;
    }
    if let Ok(val) = std::env::var("IQBRIDGE_TARGET_BACKEND") {
        config.target.backend = parse_backend("IQBRIDGE_TARGET_BACKEND", &val)?;
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("IQBRIDGE_POSTGRESQL_CONNECTION_STRING") {
        match config.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => {
                config.postgresql = Some(PostgreSQLConfig {
                    connection_string: secret_string(val),
                    max_connections: 10,
                    connection_timeout_seconds: 30,
                    statement_timeout_seconds: 60,
                })
            }
        }
    }
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("IQBRIDGE_POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                pg.max_connections = n;
            }
        }
        if let Ok(val) = std::env::var("IQBRIDGE_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                pg.statement_timeout_seconds = n;
            }
        }
    }

    // Import overrides
    if let Ok(val) = std::env::var("IQBRIDGE_IMPORT_POLL_INTERVAL_MS") {
        if let Ok(ms) = val.parse() {
            config.import.poll_interval_ms = ms;
        }
    }

    // Access overrides
    if let Ok(val) = std::env::var("IQBRIDGE_ACCESS_USERNAME") {
        config.access.username = val;
    }
    if let Ok(val) = std::env::var("IQBRIDGE_ACCESS_ROLES") {
        config.access.roles = val
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("IQBRIDGE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("IQBRIDGE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
