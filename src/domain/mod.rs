//! Domain models and types for IQBridge.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`TracnetId`], [`ConceptId`], [`TaskId`])
//! - **Legacy records** ([`LegacyPatient`], [`LegacyVisit`], [`LegacyDrugOrder`])
//! - **Code tables** ([`ExitCode`], [`TbScreenCode`], [`CivilStatus`])
//! - **Target entities** ([`Patient`], [`Encounter`], [`PatientRecord`], ...)
//! - **Error types** ([`BridgeError`], [`SourceError`], [`TargetError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Incomplete administrator mappings are an ordinary error variant, so callers
//! match on them instead of unwinding:
//!
//! ```rust
//! use iqbridge::domain::{BridgeError, MappingField};
//!
//! fn describe(err: &BridgeError) -> String {
//!     match err {
//!         BridgeError::IncompleteMapping { field: Some(field), .. } => {
//!             format!("please configure the {field}")
//!         }
//!         other => other.to_string(),
//!     }
//! }
//!
//! let err = BridgeError::incomplete(MappingField::SiteLocation, "no site location");
//! assert_eq!(describe(&err), "please configure the site location");
//! ```

pub mod codes;
pub mod context;
pub mod errors;
pub mod ids;
pub mod legacy;
pub mod observation;
pub mod result;
pub mod target;

// Re-export commonly used types for convenience
pub use codes::{CivilStatus, ExitCode, TbScreenCode};
pub use errors::{BridgeError, MappingField, SourceError, TargetError};
pub use ids::{ConceptId, TaskId, TracnetId};
pub use legacy::{LegacyDrugOrder, LegacyPatient, LegacyVisit};
pub use observation::TbScreenObs;
pub use result::Result;
pub use target::{
    ConceptRef, Drug, DrugOrder, Encounter, EncounterKind, Gender, Obs, ObsValue, Patient,
    PatientIdentifier, PatientProgram, PatientRecord, PatientSummary, PersonAddress,
};
