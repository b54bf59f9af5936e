//! Import command implementation
//!
//! Starts the background import and polls its status document until the
//! task is terminal, the way a browser polls the status endpoint.

use crate::cli::commands::{
    prepare, report_redirect, EXIT_FATAL, EXIT_INCOMPLETE, EXIT_OK, EXIT_PARTIAL,
};
use crate::core::import::{ImportTask, StatusDocument};
use crate::core::service::ViewOutcome;
use crate::domain::BridgeError;
use clap::Args;
use std::time::Duration;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// IQChart snapshot (overrides source.path)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Translate everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final status document as JSON
    #[arg(long)]
    pub json: bool,
}

impl ImportArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, service) =
            match prepare(config_path, self.source.as_deref(), true, self.dry_run).await {
                Ok(prepared) => prepared,
                Err(code) => return Ok(code),
            };

        if service.is_dry_run() {
            println!("🔍 Dry run: nothing will be written to the target");
        }

        let outcome = match service.start_import().await {
            Ok(outcome) => outcome,
            Err(e @ BridgeError::ImportAlreadyRunning { .. }) => {
                println!("❌ {e}");
                return Ok(EXIT_FATAL);
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(code) = report_redirect(&outcome) {
            return Ok(code);
        }
        let ViewOutcome::Ready(task) = outcome else {
            return Ok(EXIT_OK);
        };

        println!("🚀 Import started (task {})", task.id());

        let poll_interval = Duration::from_millis(config.import.poll_interval_ms);
        let mut last_progress = None;
        let status = loop {
            let status = service.status()?;
            if let Some(ref current) = status.task {
                if last_progress != Some(current.progress) {
                    println!(
                        "   {:>3}%  {} patients, {} encounters",
                        current.progress, current.imported_patients, current.imported_encounters
                    );
                    last_progress = Some(current.progress);
                }
            }
            if status.is_terminal() {
                break status;
            }
            tokio::time::sleep(poll_interval).await;
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Ok(report(&task, &status))
    }
}

/// Prints the final outcome and picks the exit code
fn report(task: &ImportTask, status: &StatusDocument) -> i32 {
    println!();
    let Some(ref final_status) = status.task else {
        return EXIT_FATAL;
    };

    if let Some(ref kind) = final_status.exception {
        println!("❌ Import failed: {kind}");
        if let Some(ref message) = final_status.exception_message {
            println!("   {message}");
        }
        return if kind == "IncompleteMapping" {
            EXIT_INCOMPLETE
        } else {
            EXIT_FATAL
        };
    }

    println!("✅ Import completed");
    println!("   Imported patients: {}", final_status.imported_patients);
    println!("   Imported encounters: {}", final_status.imported_encounters);
    println!("   Already imported: {}", task.duplicates());

    let skipped = task.skipped();
    if skipped.is_empty() {
        return EXIT_OK;
    }

    println!("⚠️  Skipped patients: {}", skipped.len());
    for patient in &skipped {
        println!("   {}: {}", patient.tracnet_id, patient.message);
    }
    EXIT_PARTIAL
}
