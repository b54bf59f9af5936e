//! In-memory stores
//!
//! Process-local implementations of [`PropertyStore`] and [`TargetStore`],
//! selected with `backend = "memory"` and used throughout the test suite.

use crate::adapters::database::traits::{PatientKey, PropertyStore, TargetStore};
use crate::domain::ids::{ConceptId, TracnetId};
use crate::domain::target::{
    Drug, DrugOrder, Encounter, Patient, PatientProgram, PatientRecord,
};
use crate::domain::{Result, TargetError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Property store kept in a map
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    values: RwLock<HashMap<String, Option<String>>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` has been written, null included
    pub async fn contains(&self, name: &str) -> bool {
        self.values.read().await.contains_key(name)
    }
}

#[async_trait]
impl PropertyStore for MemoryPropertyStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(name).cloned().flatten())
    }

    async fn set(&self, name: &str, value: Option<&str>) -> Result<()> {
        self.values
            .write()
            .await
            .insert(name.to_string(), value.map(str::to_string));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Debug, Default)]
struct TargetTables {
    next_key: PatientKey,
    patients: BTreeMap<PatientKey, Patient>,
    by_tracnet: HashMap<TracnetId, PatientKey>,
    programs: Vec<(PatientKey, PatientProgram)>,
    encounters: Vec<(PatientKey, Encounter)>,
    drug_orders: Vec<(PatientKey, DrugOrder)>,
    drugs: Vec<Drug>,
}

/// Target store kept in memory
#[derive(Debug, Default)]
pub struct MemoryTargetStore {
    tables: RwLock<TargetTables>,
}

impl MemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose formulary holds `drugs`
    pub fn with_drugs(drugs: Vec<Drug>) -> Self {
        Self {
            tables: RwLock::new(TargetTables {
                drugs,
                ..TargetTables::default()
            }),
        }
    }

    pub async fn patient_count(&self) -> usize {
        self.tables.read().await.patients.len()
    }

    pub async fn encounter_count(&self) -> usize {
        self.tables.read().await.encounters.len()
    }

    pub async fn drug_order_count(&self) -> usize {
        self.tables.read().await.drug_orders.len()
    }

    /// Saved patient with this TRACnet ID
    pub async fn patient(&self, tracnet_id: TracnetId) -> Option<Patient> {
        let tables = self.tables.read().await;
        tables
            .by_tracnet
            .get(&tracnet_id)
            .and_then(|key| tables.patients.get(key))
            .cloned()
    }

    /// Saved encounters of the patient with this TRACnet ID
    pub async fn encounters_of(&self, tracnet_id: TracnetId) -> Vec<Encounter> {
        let tables = self.tables.read().await;
        let Some(key) = tables.by_tracnet.get(&tracnet_id).copied() else {
            return Vec::new();
        };
        tables
            .encounters
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl TargetStore for MemoryTargetStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn patient_exists(&self, tracnet_id: TracnetId) -> Result<bool> {
        Ok(self.tables.read().await.by_tracnet.contains_key(&tracnet_id))
    }

    async fn save_record(&self, record: &PatientRecord) -> Result<PatientKey> {
        let patient = &record.patient;
        let mut tables = self.tables.write().await;
        if tables.by_tracnet.contains_key(&patient.tracnet_id) {
            return Err(TargetError::WriteFailed {
                entity: "patient",
                message: format!("TRACnet ID {} already exists", patient.tracnet_id),
            }
            .into());
        }

        tables.next_key += 1;
        let key = tables.next_key;
        tables.patients.insert(key, patient.clone());
        tables.by_tracnet.insert(patient.tracnet_id, key);
        tables
            .programs
            .extend(record.programs.iter().cloned().map(|p| (key, p)));
        tables
            .encounters
            .extend(record.encounters.iter().cloned().map(|e| (key, e)));
        tables
            .drug_orders
            .extend(record.drug_orders.iter().cloned().map(|o| (key, o)));
        Ok(key)
    }

    async fn find_drugs_by_concepts(&self, concepts: &[ConceptId]) -> Result<Vec<Drug>> {
        Ok(self
            .tables
            .read()
            .await
            .drugs
            .iter()
            .filter(|d| concepts.contains(&d.concept_id))
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::{EncounterKind, Gender, PatientIdentifier, PersonAddress};

    fn patient(id: i32) -> Patient {
        Patient {
            tracnet_id: TracnetId::new(id).unwrap(),
            identifier: PatientIdentifier {
                identifier_type_id: 4,
                identifier: id.to_string(),
                location_id: 2,
            },
            given_name: "Jean".to_string(),
            family_name: "Uwimana".to_string(),
            gender: Gender::Female,
            birthdate: None,
            address: PersonAddress {
                state_province: "Kigali".to_string(),
            },
            civil_status: None,
            dead: false,
            death_date: None,
        }
    }

    #[tokio::test]
    async fn test_property_store_null_reads_as_missing() {
        let store = MemoryPropertyStore::new();
        store.set("a", Some("1")).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.set("a", None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert!(store.contains("a").await);
        assert!(!store.contains("b").await);
    }

    fn record(id: i32) -> PatientRecord {
        let date = chrono::NaiveDate::from_ymd_opt(2010, 3, 4).unwrap();
        PatientRecord {
            patient: patient(id),
            programs: vec![PatientProgram {
                program_id: 1,
                location_id: 2,
                date_enrolled: date,
                date_completed: None,
            }],
            encounters: vec![Encounter {
                kind: EncounterKind::Initial,
                encounter_date: date,
                location_id: 2,
                observations: Vec::new(),
            }],
            drug_orders: vec![DrugOrder {
                concept_id: ConceptId(795),
                start_date: date,
                discontinued_date: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_save_record_assigns_keys() {
        let store = MemoryTargetStore::new();
        let k1 = store.save_record(&record(1)).await.unwrap();
        let k2 = store.save_record(&record(2)).await.unwrap();

        assert_ne!(k1, k2);
        assert!(store.patient_exists(TracnetId::new(1).unwrap()).await.unwrap());
        assert!(!store.patient_exists(TracnetId::new(3).unwrap()).await.unwrap());
        assert_eq!(store.patient_count().await, 2);
        assert_eq!(store.encounter_count().await, 2);
        assert_eq!(store.drug_order_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_record_leaves_store_unchanged() {
        let store = MemoryTargetStore::new();
        store.save_record(&record(1)).await.unwrap();
        assert!(store.save_record(&record(1)).await.is_err());

        assert_eq!(store.patient_count().await, 1);
        assert_eq!(store.encounter_count().await, 1);
        assert_eq!(store.drug_order_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_drugs_by_concepts() {
        let store = MemoryTargetStore::with_drugs(vec![
            Drug {
                drug_id: 1,
                concept_id: ConceptId(795),
                name: "Lamivudine 150mg".to_string(),
            },
            Drug {
                drug_id: 2,
                concept_id: ConceptId(630),
                name: "Zidovudine 300mg".to_string(),
            },
        ]);

        let found = store
            .find_drugs_by_concepts(&[ConceptId(630)])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].drug_id, 2);
    }
}
