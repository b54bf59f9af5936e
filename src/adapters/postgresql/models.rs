//! PostgreSQL row models
//!
//! Target entities are stored as JSONB documents next to the few columns
//! the bridge queries on.

use crate::domain::ids::ConceptId;
use crate::domain::target::{Drug, Encounter, EncounterKind, Patient};
use crate::domain::{BridgeError, Result};
use serde::Serialize;
use serde_json::Value;
use tokio_postgres::Row;

/// Row of the `patient` table
#[derive(Debug, Clone)]
pub struct PostgreSQLPatient {
    pub tracnet_id: i32,
    pub identifier_type_id: i32,
    pub content: Value,
    pub bridge_version: String,
}

impl PostgreSQLPatient {
    pub fn from_domain(patient: &Patient) -> Result<Self> {
        Ok(Self {
            tracnet_id: patient.tracnet_id.value(),
            identifier_type_id: patient.identifier.identifier_type_id,
            content: to_content(patient)?,
            bridge_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// Encounter kind as stored in `encounter.encounter_kind`
pub fn encounter_kind_column(encounter: &Encounter) -> &'static str {
    match encounter.kind {
        EncounterKind::Initial => "initial",
        EncounterKind::Return => "return",
        EncounterKind::Exit => "exit",
    }
}

/// Serializes an entity into a JSONB document
pub fn to_content<T: Serialize>(entity: &T) -> Result<Value> {
    serde_json::to_value(entity).map_err(|e| BridgeError::Serialization(e.to_string()))
}

/// Reads a `drug` row
pub fn drug_from_row(row: &Row) -> Result<Drug> {
    let read = |e: tokio_postgres::Error| BridgeError::Database(format!("Invalid drug row: {e}"));
    Ok(Drug {
        drug_id: row.try_get("drug_id").map_err(read)?,
        concept_id: ConceptId(row.try_get("concept_id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
    })
}
