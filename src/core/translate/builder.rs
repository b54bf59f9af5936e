//! Translation of IQChart records into target entities
//!
//! [`EntityBuilder`] reads through a [`SourceSession`] and a mapping
//! snapshot and never writes anything. Every step checks the mappings it
//! needs and fails with `IncompleteMapping` when one is unset, so a whole
//! [`PatientRecord`] is either built completely or not at all.

use crate::adapters::iqchart::SourceSession;
use crate::core::mappings::Mappings;
use crate::domain::legacy::{LegacyPatient, LegacyVisit};
use crate::domain::target::{
    ConceptRef, DrugOrder, Encounter, EncounterKind, Obs, ObsValue, Patient, PatientIdentifier,
    PatientProgram, PatientRecord, PatientSummary, PersonAddress,
};
use crate::domain::{CivilStatus, ExitCode, Gender, Result, TbScreenCode, TbScreenObs, TracnetId};

/// Question concepts of the numeric visit observations
pub mod concepts {
    pub const WEIGHT: &str = "WEIGHT (KG)";
    pub const HEIGHT: &str = "HEIGHT (CM)";
    pub const CD4_COUNT: &str = "CD4 COUNT";
}

/// Builds target entities for one unit of work
pub struct EntityBuilder<'a> {
    session: &'a SourceSession,
    mappings: &'a Mappings,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(session: &'a SourceSession, mappings: &'a Mappings) -> Self {
        Self { session, mappings }
    }

    /// Preview rows for every patient of the source
    ///
    /// # Errors
    ///
    /// Fails with `IncompleteMapping` if the demographic mappings are unset,
    /// or `InvalidCode` on an unknown stored code.
    pub fn patients(&self) -> Result<Vec<PatientSummary>> {
        self.session
            .patients()
            .into_iter()
            .map(|legacy| self.demographics(legacy).map(|p| PatientSummary::from(&p)))
            .collect()
    }

    /// Demographics of one patient
    pub fn patient(&self, tracnet_id: TracnetId) -> Result<Patient> {
        self.demographics(self.session.patient(tracnet_id)?)
    }

    /// Everything imported for one patient
    pub fn record(&self, tracnet_id: TracnetId) -> Result<PatientRecord> {
        let legacy = self.session.patient(tracnet_id)?;
        Ok(PatientRecord {
            patient: self.demographics(legacy)?,
            programs: self.programs(legacy)?,
            encounters: self.encounters(legacy)?,
            drug_orders: self.drug_orders(legacy)?,
        })
    }

    fn demographics(&self, legacy: &LegacyPatient) -> Result<Patient> {
        let identifier_type_id = self.mappings.require_tracnet_id_type()?;
        let province = self.mappings.require_address_province()?;
        let location_id = self.mappings.require_site_location()?;

        let civil_status = CivilStatus::from_code(legacy.civil_status)?
            .map(|status| ConceptRef::parse(status.mapped_answer()));
        let deceased = ExitCode::from_code(legacy.exit_code)? == Some(ExitCode::Deceased);

        Ok(Patient {
            tracnet_id: legacy.tracnet_id,
            identifier: PatientIdentifier {
                identifier_type_id,
                identifier: legacy.tracnet_id.to_string(),
                location_id,
            },
            given_name: legacy.first_name.trim().to_string(),
            family_name: legacy.last_name.trim().to_string(),
            gender: Gender::from_legacy(legacy.sex.as_deref()),
            birthdate: legacy.birth_date,
            address: PersonAddress {
                state_province: province.to_string(),
            },
            civil_status,
            dead: deceased,
            death_date: if deceased { legacy.exit_date } else { None },
        })
    }

    /// Program enrollments
    ///
    /// The HIV program mapping is always required; the TB program only for
    /// patients with a TB enrollment.
    pub fn programs(&self, legacy: &LegacyPatient) -> Result<Vec<PatientProgram>> {
        let hiv_program_id = self.mappings.require_hiv_program()?;
        let location_id = self.mappings.require_site_location()?;

        let mut programs = Vec::new();
        if let Some(enrolled) = legacy.hiv_enrolled {
            programs.push(PatientProgram {
                program_id: hiv_program_id,
                location_id,
                date_enrolled: enrolled,
                date_completed: legacy.exit_date,
            });
        }

        if let Some(enrolled) = legacy.tb_enrolled {
            programs.push(PatientProgram {
                program_id: self.mappings.require_tb_program()?,
                location_id,
                date_enrolled: enrolled,
                date_completed: None,
            });
        }

        Ok(programs)
    }

    /// Visit encounters, followed by the exit encounter if the patient left care
    pub fn encounters(&self, legacy: &LegacyPatient) -> Result<Vec<Encounter>> {
        let location_id = self.mappings.require_site_location()?;

        let mut visits = self.session.visits(legacy.tracnet_id);
        visits.sort_by_key(|v| v.visit_date);

        let mut encounters = Vec::with_capacity(visits.len() + 1);
        for (index, visit) in visits.into_iter().enumerate() {
            encounters.push(Encounter {
                kind: if index == 0 {
                    EncounterKind::Initial
                } else {
                    EncounterKind::Return
                },
                encounter_date: visit.visit_date,
                location_id,
                observations: visit_observations(visit)?,
            });
        }

        let exit = ExitCode::from_code(legacy.exit_code)?;
        if let (Some(exit), Some(exit_date)) = (exit, legacy.exit_date) {
            let value = match exit.mapped_answer() {
                Some(answer) => ObsValue::Coded(ConceptRef::parse(answer)),
                None => ObsValue::Text(exit.label().to_string()),
            };
            encounters.push(Encounter {
                kind: EncounterKind::Exit,
                encounter_date: exit_date,
                location_id,
                observations: vec![Obs {
                    concept: ConceptRef::parse(ExitCode::MAPPED_QUESTION),
                    obs_date: exit_date,
                    value,
                }],
            });
        }

        Ok(encounters)
    }

    /// Drug orders, translated through the drug mapping table
    ///
    /// The table is only consulted when the patient has orders; each
    /// referenced drug must have an entry.
    pub fn drug_orders(&self, legacy: &LegacyPatient) -> Result<Vec<DrugOrder>> {
        let orders = self.session.drug_orders(legacy.tracnet_id);
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.mappings.drug_table()?;
        orders
            .into_iter()
            .map(|order| {
                Ok(DrugOrder {
                    concept_id: table.require(order.drug_id)?,
                    start_date: order.start_date,
                    discontinued_date: order.stop_date,
                })
            })
            .collect()
    }
}

fn numeric(concept: &str, visit: &LegacyVisit, value: f64) -> Obs {
    Obs {
        concept: ConceptRef::parse(concept),
        obs_date: visit.visit_date,
        value: ObsValue::Numeric(value),
    }
}

fn visit_observations(visit: &LegacyVisit) -> Result<Vec<Obs>> {
    let mut observations = Vec::new();

    if let Some(weight) = visit.weight_kg {
        observations.push(numeric(concepts::WEIGHT, visit, weight));
    }
    if let Some(height) = visit.height_cm {
        observations.push(numeric(concepts::HEIGHT, visit, height));
    }
    if let Some(cd4) = visit.cd4_count {
        observations.push(numeric(concepts::CD4_COUNT, visit, cd4));
    }
    if let Some(code) = TbScreenCode::from_code(visit.tb_screen)? {
        observations.push(TbScreenObs::new(visit.visit_date, code).into_obs());
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::iqchart::{Snapshot, SourceDatabase};
    use crate::core::mappings::UNSET;
    use crate::domain::{BridgeError, ConceptId, MappingField};
    use chrono::NaiveDate;
    use std::sync::Arc;

    const SNAPSHOT: &str = r#"{
        "patients": [
            {
                "tracnet_id": 100, "first_name": " Jean ", "last_name": "Habimana",
                "sex": "M", "birth_date": "1970-04-02", "civil_status": 1,
                "hiv_enrolled": "2008-01-10", "tb_enrolled": "2008-03-01",
                "exit_date": "2011-12-31", "exit_code": 2
            },
            {
                "tracnet_id": 101, "first_name": "Marie", "last_name": "Mukamana",
                "sex": "F", "hiv_enrolled": "2009-05-05",
                "exit_date": "2010-06-01", "exit_code": 4
            },
            {"tracnet_id": 102, "first_name": "Eric", "last_name": "Nkurunziza", "exit_code": 9}
        ],
        "visits": [
            {"tracnet_id": 100, "visit_date": "2009-01-10", "weight_kg": 58.0, "tb_screen": 1},
            {"tracnet_id": 100, "visit_date": "2008-01-10", "weight_kg": 55.5, "height_cm": 170.0, "cd4_count": 210.0}
        ],
        "drug_orders": [
            {"tracnet_id": 100, "drug_id": 12, "start_date": "2008-02-01", "stop_date": "2009-02-01"},
            {"tracnet_id": 100, "drug_id": 13, "start_date": "2008-02-01"}
        ]
    }"#;

    fn session() -> SourceSession {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();
        SourceSession::open(Arc::new(
            SourceDatabase::from_snapshot("test", snapshot).unwrap(),
        ))
    }

    fn mappings() -> Mappings {
        let mut m = Mappings::default();
        m.set_tracnet_id_type_id(4);
        m.set_address_province(Some("Kigali".to_string()));
        m.set_hiv_program_id(1);
        m.set_tb_program_id(2);
        m.set_site_location_id(7);
        m.set_drug_mappings("12:795, 13:630");
        m
    }

    fn id(v: i32) -> TracnetId {
        TracnetId::new(v).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_demographics() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        let patient = builder.patient(id(100)).unwrap();
        assert_eq!(patient.given_name, "Jean");
        assert_eq!(patient.identifier.identifier, "100");
        assert_eq!(patient.identifier.identifier_type_id, 4);
        assert_eq!(patient.identifier.location_id, 7);
        assert_eq!(patient.address.state_province, "Kigali");
        assert_eq!(patient.gender, Gender::Male);
        assert_eq!(patient.civil_status, Some(ConceptRef::parse("MARRIED")));
        assert!(patient.dead);
        assert_eq!(patient.death_date, Some(date(2011, 12, 31)));
    }

    #[test]
    fn test_unset_identifier_type_is_incomplete() {
        let session = session();
        let mut mappings = mappings();
        mappings.set_tracnet_id_type_id(UNSET);
        let builder = EntityBuilder::new(&session, &mappings);

        let err = builder.patients().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::IncompleteMapping {
                field: Some(MappingField::TracnetIdType),
                ..
            }
        ));
    }

    #[test]
    fn test_programs_require_tb_only_when_enrolled() {
        let session = session();
        let mut mappings = mappings();
        mappings.set_tb_program_id(UNSET);
        let builder = EntityBuilder::new(&session, &mappings);

        let marie = session.patient(id(101)).unwrap();
        let programs = builder.programs(marie).unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].program_id, 1);
        assert_eq!(programs[0].date_completed, Some(date(2010, 6, 1)));

        let jean = session.patient(id(100)).unwrap();
        let err = builder.programs(jean).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::IncompleteMapping {
                field: Some(MappingField::TbProgram),
                ..
            }
        ));
    }

    #[test]
    fn test_encounters_sorted_with_exit() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        let jean = session.patient(id(100)).unwrap();
        let encounters = builder.encounters(jean).unwrap();
        let kinds: Vec<EncounterKind> = encounters.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EncounterKind::Initial,
                EncounterKind::Return,
                EncounterKind::Exit
            ]
        );

        let initial = &encounters[0];
        assert_eq!(initial.encounter_date, date(2008, 1, 10));
        assert_eq!(initial.observations.len(), 3);
        let weight_concept = ConceptRef::parse(concepts::WEIGHT);
        let weight = initial.find_obs(&weight_concept).next().unwrap();
        assert_eq!(weight.value, ObsValue::Numeric(55.5));

        let tb_concept = ConceptRef::parse(TbScreenCode::MAPPED_QUESTION);
        let tb = encounters[1].find_obs(&tb_concept).next().unwrap();
        assert_eq!(tb.value, ObsValue::Coded(ConceptRef::parse("POSITIVE")));

        let exit = &encounters[2];
        assert_eq!(exit.encounter_date, date(2011, 12, 31));
        assert_eq!(
            exit.observations[0].value,
            ObsValue::Coded(ConceptRef::parse("@concept.patientDied"))
        );
    }

    #[test]
    fn test_exit_without_answer_concept_is_text() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        let marie = session.patient(id(101)).unwrap();
        let encounters = builder.encounters(marie).unwrap();
        assert_eq!(encounters.len(), 1);
        assert_eq!(
            encounters[0].observations[0].value,
            ObsValue::Text("Stopped by doctor".to_string())
        );
    }

    #[test]
    fn test_invalid_exit_code() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        assert!(matches!(
            builder.patient(id(102)),
            Err(BridgeError::InvalidCode { kind: "exit", code: 9 })
        ));
    }

    #[test]
    fn test_drug_orders_translated() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        let record = builder.record(id(100)).unwrap();
        assert_eq!(record.drug_orders.len(), 2);
        assert_eq!(record.drug_orders[0].concept_id, ConceptId(795));
        assert_eq!(record.drug_orders[0].discontinued_date, Some(date(2009, 2, 1)));
        assert!(record
            .find_obs(&ConceptRef::parse(ExitCode::MAPPED_QUESTION))
            .is_some());
    }

    #[test]
    fn test_empty_drug_table_only_matters_with_orders() {
        let session = session();
        let mut mappings = mappings();
        mappings.set_drug_mappings("");
        let builder = EntityBuilder::new(&session, &mappings);

        assert!(builder.record(id(101)).unwrap().drug_orders.is_empty());

        let err = builder.record(id(100)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::IncompleteMapping {
                field: Some(MappingField::DrugMappings),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_patient() {
        let session = session();
        let mappings = mappings();
        let builder = EntityBuilder::new(&session, &mappings);

        assert!(matches!(
            builder.record(id(555)),
            Err(BridgeError::Source(_))
        ));
    }
}
