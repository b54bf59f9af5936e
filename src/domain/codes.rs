//! Coded values stored in the IQChart tables
//!
//! IQChart stores coded answers as raw bytes. Each code table below maps
//! those bytes explicitly, so the declaration order of a variant carries no
//! meaning and an unknown byte is reported instead of clamped.

use crate::domain::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// How a patient left a care program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCode {
    Other,
    Transferred,
    Deceased,
    Lost,
    StoppedByDoctor,
    StoppedByPatient,
}

impl ExitCode {
    /// Concept key of the "reason exited care" question
    pub const MAPPED_QUESTION: &'static str = "@concept.reasonExitedCare";

    const TABLE: [(u8, ExitCode); 6] = [
        (0, ExitCode::Other),
        (1, ExitCode::Transferred),
        (2, ExitCode::Deceased),
        (3, ExitCode::Lost),
        (4, ExitCode::StoppedByDoctor),
        (5, ExitCode::StoppedByPatient),
    ];

    /// Decodes a stored byte
    ///
    /// `None` means the patient has no exit code.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidCode` for bytes outside the table.
    pub fn from_code(code: Option<u8>) -> Result<Option<Self>> {
        decode(&Self::TABLE, "exit", code)
    }

    /// Stored byte for this variant
    pub fn code(&self) -> u8 {
        encode(&Self::TABLE, *self)
    }

    /// Answer concept key, if the target dictionary has one
    pub fn mapped_answer(&self) -> Option<&'static str> {
        match self {
            ExitCode::Other => None,
            ExitCode::Transferred => Some("PATIENT TRANSFERRED OUT"),
            ExitCode::Deceased => Some("@concept.patientDied"),
            ExitCode::Lost => Some("PATIENT DEFAULTED"),
            ExitCode::StoppedByDoctor => None,
            ExitCode::StoppedByPatient => Some("PATIENT REFUSED"),
        }
    }

    /// Free-text label, used when there is no answer concept
    pub fn label(&self) -> &'static str {
        match self {
            ExitCode::Other => "Other",
            ExitCode::Transferred => "Transferred",
            ExitCode::Deceased => "Deceased",
            ExitCode::Lost => "Lost to follow-up",
            ExitCode::StoppedByDoctor => "Stopped by doctor",
            ExitCode::StoppedByPatient => "Stopped by patient",
        }
    }
}

/// Result of a TB screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TbScreenCode {
    Negative,
    Positive,
    NotDone,
}

impl TbScreenCode {
    /// Concept key of the screening question
    pub const MAPPED_QUESTION: &'static str = "TUBERCULOSIS SCREENING";

    const TABLE: [(u8, TbScreenCode); 3] = [
        (0, TbScreenCode::Negative),
        (1, TbScreenCode::Positive),
        (2, TbScreenCode::NotDone),
    ];

    /// Decodes a stored byte
    pub fn from_code(code: Option<u8>) -> Result<Option<Self>> {
        decode(&Self::TABLE, "TB screen", code)
    }

    /// Answer concept key
    pub fn mapped_answer(&self) -> &'static str {
        match self {
            TbScreenCode::Negative => "NEGATIVE",
            TbScreenCode::Positive => "POSITIVE",
            TbScreenCode::NotDone => "NOT DONE",
        }
    }
}

/// Civil status recorded at enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    Cohabiting,
}

impl CivilStatus {
    const TABLE: [(u8, CivilStatus); 5] = [
        (0, CivilStatus::Single),
        (1, CivilStatus::Married),
        (2, CivilStatus::Divorced),
        (3, CivilStatus::Widowed),
        (4, CivilStatus::Cohabiting),
    ];

    /// Decodes a stored byte
    pub fn from_code(code: Option<u8>) -> Result<Option<Self>> {
        decode(&Self::TABLE, "civil status", code)
    }

    /// Answer concept key
    pub fn mapped_answer(&self) -> &'static str {
        match self {
            CivilStatus::Single => "NEVER MARRIED",
            CivilStatus::Married => "MARRIED",
            CivilStatus::Divorced => "DIVORCED",
            CivilStatus::Widowed => "WIDOWED",
            CivilStatus::Cohabiting => "LIVING WITH PARTNER",
        }
    }
}

fn decode<T: Copy>(table: &[(u8, T)], kind: &'static str, code: Option<u8>) -> Result<Option<T>> {
    let Some(code) = code else {
        return Ok(None);
    };
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, value)| Some(*value))
        .ok_or(BridgeError::InvalidCode { kind, code })
}

fn encode<T: Copy + PartialEq>(table: &[(u8, T)], value: T) -> u8 {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(c, _)| *c)
        .unwrap_or_default()
}
