//! Mappings command implementation
//!
//! `mappings show` prints the stored mappings and what they reach in the
//! target; `mappings set` edits individual fields and saves them.

use crate::cli::commands::{prepare, EXIT_FATAL, EXIT_INCOMPLETE, EXIT_OK};
use crate::core::mappings::{Mappings, UNSET};
use crate::core::service::{BridgeService, ViewOutcome};
use clap::{Args, Subcommand};

/// Arguments for the mappings command
#[derive(Args, Debug)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub action: MappingsAction,
}

#[derive(Subcommand, Debug)]
pub enum MappingsAction {
    /// Show the configured mappings
    Show,

    /// Change one or more mappings
    Set(SetArgs),
}

/// Fields to change; omitted fields keep their value
#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Patient identifier type for TRACnet IDs (-1 to unset)
    #[arg(long, allow_negative_numbers = true)]
    pub tracnet_id_type: Option<i32>,

    /// Default address province (empty to unset)
    #[arg(long)]
    pub province: Option<String>,

    /// HIV program (-1 to unset)
    #[arg(long, allow_negative_numbers = true)]
    pub hiv_program: Option<i32>,

    /// TB program (-1 to unset)
    #[arg(long, allow_negative_numbers = true)]
    pub tb_program: Option<i32>,

    /// Site location (-1 to unset)
    #[arg(long, allow_negative_numbers = true)]
    pub site_location: Option<i32>,

    /// Drug table, e.g. "12:795, 13:630"
    #[arg(long)]
    pub drug_mappings: Option<String>,
}

impl SetArgs {
    /// Applies the given fields to `mappings`
    pub fn apply(&self, mappings: &mut Mappings) {
        if let Some(id) = self.tracnet_id_type {
            mappings.set_tracnet_id_type_id(id);
        }
        if let Some(ref province) = self.province {
            let province = province.trim();
            mappings.set_address_province((!province.is_empty()).then(|| province.to_string()));
        }
        if let Some(id) = self.hiv_program {
            mappings.set_hiv_program_id(id);
        }
        if let Some(id) = self.tb_program {
            mappings.set_tb_program_id(id);
        }
        if let Some(id) = self.site_location {
            mappings.set_site_location_id(id);
        }
        if let Some(ref drugs) = self.drug_mappings {
            mappings.set_drug_mappings(drugs.trim());
        }
    }
}

fn selector(value: i32) -> String {
    if value == UNSET {
        "(unset)".to_string()
    } else {
        value.to_string()
    }
}

impl MappingsArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, service) = match prepare(config_path, None, false, false).await {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        match self.action {
            MappingsAction::Show => show(&service).await,
            MappingsAction::Set(ref args) => set(&service, args).await,
        }
    }
}

async fn show(service: &BridgeService) -> anyhow::Result<i32> {
    let mappings = service.mappings().await?.snapshot().await;

    println!("🗺️  Entity Mappings");
    println!();
    println!("  TRACnet ID Type: {}", selector(mappings.tracnet_id_type_id()));
    println!(
        "  Address Province: {}",
        mappings.address_province().unwrap_or("(unset)")
    );
    println!("  HIV Program: {}", selector(mappings.hiv_program_id()));
    println!("  TB Program: {}", selector(mappings.tb_program_id()));
    println!("  Site Location: {}", selector(mappings.site_location_id()));
    println!();

    match service.drug_mapping_report().await? {
        ViewOutcome::Ready(entries) if entries.is_empty() => {
            println!("  Drug Mappings: (none)");
        }
        ViewOutcome::Ready(entries) => {
            println!("  Drug Mappings:");
            for entry in entries {
                let names: Vec<&str> = entry.drugs.iter().map(|d| d.name.as_str()).collect();
                println!(
                    "    {} → concept {} ({})",
                    entry.legacy_drug_id,
                    entry.concept_id,
                    if names.is_empty() {
                        "no target drugs".to_string()
                    } else {
                        names.join(", ")
                    }
                );
            }
        }
        ViewOutcome::ConfigureMappings { message } => {
            println!("  Drug Mappings: ⚠️  {message}");
        }
        ViewOutcome::AttachSource => {}
    }
    println!();

    let missing = mappings.missing_fields();
    if missing.is_empty() {
        println!("✅ All mappings configured");
        Ok(EXIT_OK)
    } else {
        let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
        println!("⚠️  Missing: {}", names.join(", "));
        Ok(EXIT_INCOMPLETE)
    }
}

async fn set(service: &BridgeService, args: &SetArgs) -> anyhow::Result<i32> {
    let mut mappings = service.mappings().await?.snapshot().await;
    args.apply(&mut mappings);

    if let Err(e) = mappings.drug_table() {
        println!("❌ {e}");
        return Ok(EXIT_INCOMPLETE);
    }

    match service.save_mappings(mappings).await {
        Ok(()) => {
            println!("✅ Mappings saved");
            Ok(EXIT_OK)
        }
        Err(e) => {
            println!("❌ Failed to save mappings");
            println!("   Error: {e}");
            Ok(EXIT_FATAL)
        }
    }
}
