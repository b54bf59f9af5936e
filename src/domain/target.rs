//! Target (OpenMRS) entity shapes
//!
//! These are the records the bridge hands to a [`TargetStore`]. Concepts are
//! addressed by [`ConceptRef`] and resolved by the store.
//!
//! [`TargetStore`]: crate::adapters::database::traits::TargetStore

use crate::domain::ids::{ConceptId, TracnetId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a concept of the target dictionary
///
/// Written either as a plain concept name or as `@concept.<key>`, meaning the
/// concept configured under that key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum ConceptRef {
    Name(String),
    Property(String),
}

impl ConceptRef {
    const PROPERTY_PREFIX: &'static str = "@";

    /// Parses a concept key
    ///
    /// # Examples
    ///
    /// ```
    /// use iqbridge::domain::target::ConceptRef;
    ///
    /// assert_eq!(
    ///     ConceptRef::parse("@concept.patientDied"),
    ///     ConceptRef::Property("concept.patientDied".to_string())
    /// );
    /// assert_eq!(
    ///     ConceptRef::parse("PATIENT DEFAULTED"),
    ///     ConceptRef::Name("PATIENT DEFAULTED".to_string())
    /// );
    /// ```
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix(Self::PROPERTY_PREFIX) {
            Some(property) => ConceptRef::Property(property.to_string()),
            None => ConceptRef::Name(key.to_string()),
        }
    }
}

impl fmt::Display for ConceptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptRef::Name(name) => f.write_str(name),
            ConceptRef::Property(key) => write!(f, "{}{}", Self::PROPERTY_PREFIX, key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    /// Interprets the IQChart sex column
    pub fn from_legacy(sex: Option<&str>) -> Self {
        match sex.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("M") => Gender::Male,
            Some("F") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientIdentifier {
    pub identifier_type_id: i32,
    pub identifier: String,
    pub location_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonAddress {
    pub state_province: String,
}

/// A target patient with demographics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub tracnet_id: TracnetId,
    pub identifier: PatientIdentifier,
    pub given_name: String,
    pub family_name: String,
    pub gender: Gender,
    pub birthdate: Option<NaiveDate>,
    pub address: PersonAddress,
    pub civil_status: Option<ConceptRef>,
    pub dead: bool,
    pub death_date: Option<NaiveDate>,
}

/// Enrollment of a patient in a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProgram {
    pub program_id: i32,
    pub location_id: i32,
    pub date_enrolled: NaiveDate,
    pub date_completed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    Initial,
    Return,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ObsValue {
    Numeric(f64),
    Coded(ConceptRef),
    Text(String),
}

/// A single observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obs {
    pub concept: ConceptRef,
    pub obs_date: NaiveDate,
    pub value: ObsValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub kind: EncounterKind,
    pub encounter_date: NaiveDate,
    pub location_id: i32,
    pub observations: Vec<Obs>,
}

impl Encounter {
    /// Observations answering the given question concept
    pub fn find_obs<'a>(&'a self, concept: &ConceptRef) -> impl Iterator<Item = &'a Obs> + 'a {
        let concept = concept.clone();
        self.observations
            .iter()
            .filter(move |o| o.concept == concept)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugOrder {
    pub concept_id: ConceptId,
    pub start_date: NaiveDate,
    pub discontinued_date: Option<NaiveDate>,
}

/// A drug of the target formulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub drug_id: i32,
    pub concept_id: ConceptId,
    pub name: String,
}

/// Everything imported for one legacy patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient: Patient,
    pub programs: Vec<PatientProgram>,
    pub encounters: Vec<Encounter>,
    pub drug_orders: Vec<DrugOrder>,
}

impl PatientRecord {
    /// First observation answering `concept` across all encounters
    pub fn find_obs(&self, concept: &ConceptRef) -> Option<&Obs> {
        self.encounters
            .iter()
            .flat_map(|e| e.observations.iter())
            .find(|o| &o.concept == concept)
    }
}

/// Preview row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub tracnet_id: TracnetId,
    pub identifier: String,
    pub given_name: String,
    pub family_name: String,
    pub gender: Gender,
    pub birthdate: Option<NaiveDate>,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            tracnet_id: patient.tracnet_id,
            identifier: patient.identifier.identifier.clone(),
            given_name: patient.given_name.clone(),
            family_name: patient.family_name.clone(),
            gender: patient.gender,
            birthdate: patient.birthdate,
        }
    }
}
