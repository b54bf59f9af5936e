//! Patient command implementation
//!
//! Shows everything one patient would be imported as.

use crate::cli::commands::{prepare, report_redirect, EXIT_FATAL, EXIT_OK};
use crate::core::service::{PatientDetail, ViewOutcome};
use crate::domain::target::{EncounterKind, ObsValue};
use crate::domain::{BridgeError, SourceError, TracnetId};
use clap::Args;

/// Arguments for the patient command
#[derive(Args, Debug)]
pub struct PatientArgs {
    /// TRACnet ID of the patient
    #[arg(short, long)]
    pub tracnet_id: TracnetId,

    /// IQChart snapshot (overrides source.path)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

fn value_text(value: &ObsValue) -> String {
    match value {
        ObsValue::Numeric(n) => n.to_string(),
        ObsValue::Coded(concept) => concept.to_string(),
        ObsValue::Text(text) => text.clone(),
    }
}

fn print_detail(detail: &PatientDetail) {
    let record = &detail.record;
    let patient = &record.patient;

    println!(
        "🧑 {} {} (TRACnet {})",
        patient.given_name, patient.family_name, patient.tracnet_id
    );
    println!();
    println!("  Gender: {:?}", patient.gender);
    if let Some(birthdate) = patient.birthdate {
        println!("  Born: {birthdate}");
    }
    println!("  Province: {}", patient.address.state_province);
    if let Some(ref status) = detail.civil_status {
        println!("  Civil Status: {status}");
    }
    if patient.dead {
        match patient.death_date {
            Some(date) => println!("  Deceased: {date}"),
            None => println!("  Deceased"),
        }
    }
    if let Some(ref exit) = detail.exit_obs {
        println!("  Exit Reason: {} ({})", value_text(&exit.value), exit.obs_date);
    }

    println!();
    println!("  Programs:");
    for program in &record.programs {
        println!(
            "    program {} enrolled {}{}",
            program.program_id,
            program.date_enrolled,
            program
                .date_completed
                .map(|d| format!(", completed {d}"))
                .unwrap_or_default()
        );
    }

    println!("  Encounters:");
    for encounter in &record.encounters {
        let kind = match encounter.kind {
            EncounterKind::Initial => "initial",
            EncounterKind::Return => "return",
            EncounterKind::Exit => "exit",
        };
        println!("    {} {}", encounter.encounter_date, kind);
        for obs in &encounter.observations {
            println!("      {}: {}", obs.concept, value_text(&obs.value));
        }
    }

    println!("  Drug Orders:");
    for order in &record.drug_orders {
        println!(
            "    concept {} from {}{}",
            order.concept_id,
            order.start_date,
            order
                .discontinued_date
                .map(|d| format!(" to {d}"))
                .unwrap_or_default()
        );
    }
    println!();
}

impl PatientArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, service) = match prepare(config_path, self.source.as_deref(), true, false).await {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let outcome = match service.patient(self.tracnet_id).await {
            Ok(outcome) => outcome,
            Err(BridgeError::Source(SourceError::PatientNotFound(id))) => {
                println!("❌ No patient with TRACnet ID {id}");
                return Ok(EXIT_FATAL);
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(code) = report_redirect(&outcome) {
            return Ok(code);
        }
        let ViewOutcome::Ready(detail) = outcome else {
            return Ok(EXIT_OK);
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&detail)?);
        } else {
            print_detail(&detail);
        }
        Ok(EXIT_OK)
    }
}
