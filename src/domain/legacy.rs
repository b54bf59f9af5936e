//! Legacy IQChart records
//!
//! Row shapes of the IQChart tables the bridge reads. Coded columns keep
//! their raw stored bytes; decoding happens during translation.

use crate::domain::ids::TracnetId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the IQChart patient table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPatient {
    pub tracnet_id: TracnetId,
    pub first_name: String,
    pub last_name: String,
    /// "M" or "F"; anything else is imported as unknown
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Raw civil status byte
    #[serde(default)]
    pub civil_status: Option<u8>,
    /// HIV program enrollment date
    #[serde(default)]
    pub hiv_enrolled: Option<NaiveDate>,
    /// TB program enrollment date
    #[serde(default)]
    pub tb_enrolled: Option<NaiveDate>,
    #[serde(default)]
    pub exit_date: Option<NaiveDate>,
    /// Raw exit code byte
    #[serde(default)]
    pub exit_code: Option<u8>,
}

/// A row of the IQChart visit table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyVisit {
    pub tracnet_id: TracnetId,
    pub visit_date: NaiveDate,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub cd4_count: Option<f64>,
    /// Raw TB screening byte
    #[serde(default)]
    pub tb_screen: Option<u8>,
}

/// A row of the IQChart patient drug table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyDrugOrder {
    pub tracnet_id: TracnetId,
    /// IQChart drug ID, translated through the drug mapping table
    pub drug_id: i32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub stop_date: Option<NaiveDate>,
}
