//! Logging and observability
//!
//! Structured logging built on `tracing`, plus a few macros that keep the
//! field names of recurring import events consistent.
//!
//! # Example
//!
//! ```no_run
//! use iqbridge::logging::init_logging;
//! use iqbridge::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Bridge started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an import task
///
/// # Example
///
/// ```no_run
/// use iqbridge::log_import_start;
/// use iqbridge::domain::TaskId;
///
/// let task_id = TaskId::generate();
/// log_import_start!(&task_id, 250, false);
/// ```
#[macro_export]
macro_rules! log_import_start {
    ($task_id:expr, $total:expr, $dry_run:expr) => {
        tracing::info!(
            task_id = %$task_id,
            total_patients = $total,
            dry_run = $dry_run,
            "Starting import"
        );
    };
}

/// Log the completion of an import task
#[macro_export]
macro_rules! log_import_complete {
    ($task_id:expr, $patients:expr, $encounters:expr, $duration:expr) => {
        tracing::info!(
            task_id = %$task_id,
            imported_patients = $patients,
            imported_encounters = $encounters,
            duration_ms = $duration.as_millis() as u64,
            "Import completed"
        );
    };
}

/// Log a patient left out of an import
///
/// # Example
///
/// ```no_run
/// use iqbridge::log_patient_skipped;
///
/// log_patient_skipped!(100123, "drug mappings not configured");
/// ```
#[macro_export]
macro_rules! log_patient_skipped {
    ($tracnet_id:expr, $reason:expr) => {
        tracing::warn!(
            tracnet_id = %$tracnet_id,
            reason = %$reason,
            "Patient skipped"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
