//! Store abstraction traits
//!
//! The bridge talks to two external stores: the key-value configuration
//! store holding administrator mappings, and the target record system that
//! receives imported entities. Both are trait objects so the CLI can pick a
//! backend from configuration and tests can supply their own.

use crate::domain::ids::{ConceptId, TracnetId};
use crate::domain::target::{Drug, PatientRecord};
use crate::domain::Result;
use async_trait::async_trait;

/// Key of a saved target patient, used to attach dependent entities
pub type PatientKey = i64;

/// Key-value configuration store
///
/// Values are plain strings; `None` is the store's null.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Reads a property
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when the property is missing or null.
    async fn get(&self, name: &str) -> Result<Option<String>>;

    /// Creates or replaces a property
    ///
    /// Passing `None` stores null.
    async fn set(&self, name: &str, value: Option<&str>) -> Result<()>;

    /// Short description used in logs
    fn describe(&self) -> String;
}

/// Target record system
///
/// A patient and everything attached to it is written as one
/// [`PatientRecord`].
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Test the connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Whether a patient with this TRACnet ID has already been imported
    async fn patient_exists(&self, tracnet_id: TracnetId) -> Result<bool>;

    /// Saves a patient with its programs, encounters and drug orders
    ///
    /// All or nothing: when this fails, none of the record is stored, so a
    /// later import can retry the patient.
    async fn save_record(&self, record: &PatientRecord) -> Result<PatientKey>;

    /// Formulary drugs whose concept is one of `concepts`
    async fn find_drugs_by_concepts(&self, concepts: &[ConceptId]) -> Result<Vec<Drug>>;

    /// Short description used in logs
    fn describe(&self) -> String;
}
