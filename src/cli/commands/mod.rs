//! CLI command implementations
//!
//! Commands print operator-facing output and return the process exit code:
//!
//! | code | meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | partial success (patients skipped) |
//! | 2 | configuration error |
//! | 3 | incomplete mappings or no IQChart source |
//! | 4 | store connection error |
//! | 5 | fatal error |

pub mod import;
pub mod init;
pub mod mappings;
pub mod patient;
pub mod preview;
pub mod validate;

use crate::adapters::database::create_stores;
use crate::config::{load_config, BridgeConfig};
use crate::core::access::Operator;
use crate::core::service::{BridgeService, ViewOutcome};

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_INCOMPLETE: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// A service ready for a command, or the exit code to stop with
pub(crate) type Prepared = std::result::Result<(BridgeConfig, BridgeService), i32>;

/// Loads the configuration, connects the stores and attaches the source
///
/// `source` overrides `source.path`; `require_source` makes a missing
/// snapshot path an error.
pub(crate) async fn prepare(
    config_path: &str,
    source: Option<&str>,
    require_source: bool,
    dry_run: bool,
) -> Prepared {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            println!("❌ Failed to load configuration file");
            println!("   Error: {e}");
            return Err(EXIT_CONFIG);
        }
    };

    let stores = match create_stores(&config).await {
        Ok(s) => s,
        Err(e) => {
            println!("❌ Failed to connect to the stores");
            println!("   Error: {e}");
            return Err(EXIT_CONNECTION);
        }
    };

    let service = BridgeService::new(
        Operator::from(&config.access),
        stores,
        dry_run || config.application.dry_run,
    );

    let source_path = source.or(config.source.path.as_deref());
    match source_path {
        Some(path) => {
            if let Err(e) = service.attach_source(path).await {
                println!("❌ Failed to attach IQChart snapshot: {path}");
                println!("   Error: {e}");
                return Err(EXIT_INCOMPLETE);
            }
        }
        None if require_source => {
            println!("❌ No IQChart snapshot given");
            println!("   Pass --source or set source.path in the configuration");
            return Err(EXIT_INCOMPLETE);
        }
        None => {}
    }

    Ok((config, service))
}

/// Prints the redirect of a non-ready view and returns its exit code
pub(crate) fn report_redirect<T>(outcome: &ViewOutcome<T>) -> Option<i32> {
    match outcome {
        ViewOutcome::Ready(_) => None,
        ViewOutcome::AttachSource => {
            println!("❌ No IQChart database attached");
            println!("   Pass --source or set source.path in the configuration");
            Some(EXIT_INCOMPLETE)
        }
        ViewOutcome::ConfigureMappings { message } => {
            println!("❌ {message}");
            println!("   Configure the mappings with: iqbridge mappings set");
            Some(EXIT_INCOMPLETE)
        }
    }
}
