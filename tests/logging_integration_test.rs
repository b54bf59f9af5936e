//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so a single
//! test calls `init_logging` successfully.

use iqbridge::config::LoggingConfig;
use iqbridge::domain::TaskId;
use iqbridge::logging::init_logging;
use iqbridge::{log_error_with_context, log_import_complete, log_import_start, log_patient_skipped};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_path, "/var/log/iqbridge");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    let err = init_logging("chatty", &config).err().unwrap();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    // Events below are emitted from this crate, outside the default filter
    std::env::set_var("RUST_LOG", "debug");
    let guard = init_logging("debug", &config).expect("Failed to initialize logging");
    assert!(log_path.exists());

    let task_id = TaskId::generate();
    log_import_start!(task_id, 3, false);
    log_patient_skipped!(101, "No drug mapping for IQChart drug 12");
    log_import_complete!(task_id, 2, 4, Duration::from_millis(15));
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("iqbridge.log")).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let skipped = lines
        .iter()
        .find(|l| l["fields"]["message"] == "Patient skipped")
        .expect("skipped patient not logged");
    assert_eq!(skipped["level"], "WARN");
    assert_eq!(skipped["fields"]["tracnet_id"], "101");

    let completed = lines
        .iter()
        .find(|l| l["fields"]["message"] == "Import completed")
        .expect("completion not logged");
    assert_eq!(completed["fields"]["imported_patients"], 2);
    assert_eq!(completed["fields"]["task_id"], task_id.to_string());
}

#[test]
fn test_macros_without_subscriber() {
    let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
    log_error_with_context!(err, "reading snapshot");
}
