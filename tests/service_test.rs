//! Integration tests for the bridge service entry points

use iqbridge::adapters::database::{MemoryPropertyStore, MemoryTargetStore, Stores};
use iqbridge::core::access::{Operator, SUPER_USER_ROLE};
use iqbridge::core::mappings::Mappings;
use iqbridge::core::service::{BridgeService, ViewOutcome};
use iqbridge::domain::target::{ConceptRef, Drug, ObsValue};
use iqbridge::domain::{BridgeError, ConceptId, ExitCode, SourceError, TracnetId};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{
    "patients": [
        {"tracnet_id": 100, "first_name": "Jean", "last_name": "Habimana", "sex": "M",
         "birth_date": "1970-04-02", "civil_status": 1,
         "hiv_enrolled": "2008-01-10", "exit_date": "2011-12-31", "exit_code": 2},
        {"tracnet_id": 101, "first_name": "Marie", "last_name": "Mukamana", "sex": "F"}
    ],
    "visits": [
        {"tracnet_id": 100, "visit_date": "2008-01-10", "weight_kg": 55.5}
    ],
    "drug_orders": []
}"#;

fn snapshot_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn complete_mappings() -> Mappings {
    let mut m = Mappings::default();
    m.set_tracnet_id_type_id(4);
    m.set_address_province(Some("Kigali".to_string()));
    m.set_hiv_program_id(1);
    m.set_tb_program_id(2);
    m.set_site_location_id(7);
    m.set_drug_mappings("12:795,14:630");
    m
}

fn service_for(operator: Operator, target: MemoryTargetStore) -> BridgeService {
    let stores = Stores {
        properties: Arc::new(MemoryPropertyStore::new()),
        target: Arc::new(target),
    };
    BridgeService::new(operator, stores, false)
}

fn admin() -> Operator {
    Operator::new("admin", vec![SUPER_USER_ROLE.to_string()])
}

#[tokio::test]
async fn test_every_entry_point_requires_super_user() {
    let service = service_for(
        Operator::new("clerk", vec!["Data Clerk".to_string()]),
        MemoryTargetStore::new(),
    );

    assert!(matches!(
        service.preview().await,
        Err(BridgeError::AccessDenied(_))
    ));
    assert!(matches!(
        service.start_import().await,
        Err(BridgeError::AccessDenied(_))
    ));
    assert!(matches!(service.status(), Err(BridgeError::AccessDenied(_))));
    assert!(matches!(
        service.save_mappings(complete_mappings()).await,
        Err(BridgeError::AccessDenied(_))
    ));
    assert!(matches!(
        service.attach_source("/nonexistent.json").await,
        Err(BridgeError::AccessDenied(_))
    ));
}

#[tokio::test]
async fn test_views_redirect_until_source_and_mappings() {
    let service = service_for(admin(), MemoryTargetStore::new());
    assert_eq!(service.preview().await.unwrap(), ViewOutcome::AttachSource);

    let file = snapshot_file();
    let database = service.attach_source(file.path()).await.unwrap();
    assert_eq!(database.patient_count(), 2);

    match service.preview().await.unwrap() {
        ViewOutcome::ConfigureMappings { message } => assert_eq!(
            message,
            "The TRACnet ID identifier type has not been configured"
        ),
        other => panic!("unexpected outcome: {other:?}"),
    }

    service.save_mappings(complete_mappings()).await.unwrap();
    let rows = service.preview().await.unwrap().ready().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].given_name, "Jean");
    assert_eq!(rows[1].family_name, "Mukamana");

    assert!(service.detach_source().unwrap());
    assert_eq!(service.preview().await.unwrap(), ViewOutcome::AttachSource);
}

#[tokio::test]
async fn test_patient_detail() {
    let service = service_for(admin(), MemoryTargetStore::new());
    let file = snapshot_file();
    service.attach_source(file.path()).await.unwrap();
    service.save_mappings(complete_mappings()).await.unwrap();

    let detail = service
        .patient(TracnetId::new(100).unwrap())
        .await
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(detail.civil_status, Some(ConceptRef::parse("MARRIED")));
    let exit = detail.exit_obs.unwrap();
    assert_eq!(exit.concept, ConceptRef::parse(ExitCode::MAPPED_QUESTION));
    assert_eq!(
        exit.value,
        ObsValue::Coded(ConceptRef::parse("@concept.patientDied"))
    );
    assert!(detail.record.patient.dead);

    let marie = service
        .patient(TracnetId::new(101).unwrap())
        .await
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(marie.exit_obs, None);
    assert_eq!(marie.civil_status, None);
}

#[tokio::test]
async fn test_unknown_patient_is_an_error() {
    let service = service_for(admin(), MemoryTargetStore::new());
    let file = snapshot_file();
    service.attach_source(file.path()).await.unwrap();
    service.save_mappings(complete_mappings()).await.unwrap();

    let err = service
        .patient(TracnetId::new(555).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Source(SourceError::PatientNotFound(555))
    ));
}

#[tokio::test]
async fn test_drug_mapping_report() {
    let target = MemoryTargetStore::with_drugs(vec![
        Drug {
            drug_id: 1,
            concept_id: ConceptId(795),
            name: "Lamivudine 150mg".to_string(),
        },
        Drug {
            drug_id: 2,
            concept_id: ConceptId(795),
            name: "Lamivudine 10mg/ml".to_string(),
        },
        Drug {
            drug_id: 3,
            concept_id: ConceptId(1000),
            name: "Unmapped".to_string(),
        },
    ]);
    let service = service_for(admin(), target);

    match service.drug_mapping_report().await.unwrap() {
        ViewOutcome::Ready(entries) => assert!(entries.is_empty()),
        other => panic!("unexpected outcome: {other:?}"),
    }

    service.save_mappings(complete_mappings()).await.unwrap();
    let entries = service
        .drug_mapping_report()
        .await
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(entries.len(), 2);
    let lamivudine = entries.iter().find(|e| e.legacy_drug_id == 12).unwrap();
    assert_eq!(lamivudine.concept_id, ConceptId(795));
    assert_eq!(lamivudine.drugs.len(), 2);
    let other = entries.iter().find(|e| e.legacy_drug_id == 14).unwrap();
    assert!(other.drugs.is_empty());
}

#[tokio::test]
async fn test_malformed_drug_table_redirects() {
    let service = service_for(admin(), MemoryTargetStore::new());
    let mut mappings = complete_mappings();
    mappings.set_drug_mappings("12:abc");
    service.save_mappings(mappings).await.unwrap();

    assert!(matches!(
        service.drug_mapping_report().await.unwrap(),
        ViewOutcome::ConfigureMappings { .. }
    ));
}

#[tokio::test]
async fn test_target_connection() {
    let service = service_for(admin(), MemoryTargetStore::new());
    service.test_target().await.unwrap();
}
