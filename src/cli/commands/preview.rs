//! Preview command implementation
//!
//! Translates every source patient without writing anything.

use crate::cli::commands::{prepare, report_redirect, EXIT_OK};
use crate::core::service::ViewOutcome;
use clap::Args;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// IQChart snapshot (overrides source.path)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl PreviewArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, service) = match prepare(config_path, self.source.as_deref(), true, false).await {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let outcome = service.preview().await?;
        if let Some(code) = report_redirect(&outcome) {
            return Ok(code);
        }
        let ViewOutcome::Ready(patients) = outcome else {
            return Ok(EXIT_OK);
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&patients)?);
            return Ok(EXIT_OK);
        }

        println!("👥 {} patients", patients.len());
        println!();
        println!(
            "  {:>10}  {:<20}  {:<20}  {:<6}  {:<10}",
            "TRACnet", "Given name", "Family name", "Gender", "Born"
        );
        for patient in &patients {
            println!(
                "  {:>10}  {:<20}  {:<20}  {:<6}  {:<10}",
                patient.tracnet_id,
                patient.given_name,
                patient.family_name,
                format!("{:?}", patient.gender),
                patient
                    .birthdate
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            );
        }
        println!();

        Ok(EXIT_OK)
    }
}
