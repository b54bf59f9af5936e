//! PostgreSQL adapter implementing the store traits

use crate::adapters::database::traits::{PatientKey, PropertyStore, TargetStore};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    drug_from_row, encounter_kind_column, to_content, PostgreSQLPatient,
};
use crate::domain::ids::{ConceptId, TracnetId};
use crate::domain::target::{Drug, DrugOrder, Encounter, Patient, PatientProgram, PatientRecord};
use crate::domain::{BridgeError, Result, TargetError};
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use tokio_postgres::Transaction;

fn write_failed<E: Display>(entity: &'static str) -> impl Fn(E) -> BridgeError {
    move |e| {
        TargetError::WriteFailed {
            entity,
            message: e.to_string(),
        }
        .into()
    }
}

/// PostgreSQL implementation of [`PropertyStore`] and [`TargetStore`]
///
/// Both traits share one connection pool.
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl PropertyStore for PostgreSQLAdapter {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        let rows = self
            .client
            .query(
                "SELECT property_value FROM global_property WHERE property = $1",
                &[&name],
            )
            .await?;

        match rows.first() {
            Some(row) => row.try_get::<_, Option<String>>("property_value").map_err(|e| {
                BridgeError::Database(format!("Invalid global_property row: {e}"))
            }),
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, value: Option<&str>) -> Result<()> {
        tracing::debug!(property = %name, is_null = value.is_none(), "Saving global property");

        self.client
            .execute(
                r#"
                INSERT INTO global_property (property, property_value, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (property) DO UPDATE SET
                    property_value = EXCLUDED.property_value,
                    updated_at = EXCLUDED.updated_at
                "#,
                &[&name, &value],
            )
            .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("postgresql:{}", self.client.connection_string_safe())
    }
}

#[async_trait]
impl TargetStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client
            .test_connection()
            .await
            .map_err(|e| TargetError::ConnectionFailed(e.to_string()).into())
    }

    async fn patient_exists(&self, tracnet_id: TracnetId) -> Result<bool> {
        let rows = self
            .client
            .query(
                "SELECT 1 FROM patient WHERE tracnet_id = $1",
                &[&tracnet_id.value()],
            )
            .await
            .map_err(|e| TargetError::QueryFailed(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    async fn save_record(&self, record: &PatientRecord) -> Result<PatientKey> {
        let mut conn = self.client.connection_with_timeout().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(write_failed("patient"))?;

        let key = insert_patient(&tx, &record.patient).await?;
        insert_programs(&tx, key, &record.programs).await?;
        insert_encounters(&tx, key, &record.encounters).await?;
        insert_drug_orders(&tx, key, &record.drug_orders).await?;
        tx.commit().await.map_err(write_failed("patient"))?;

        tracing::debug!(tracnet_id = %record.patient.tracnet_id, patient_id = key, "Patient saved");
        Ok(key)
    }

    async fn find_drugs_by_concepts(&self, concepts: &[ConceptId]) -> Result<Vec<Drug>> {
        if concepts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = concepts.iter().map(|c| c.0).collect();
        let rows = self
            .client
            .query(
                "SELECT drug_id, concept_id, name FROM drug WHERE concept_id = ANY($1) ORDER BY drug_id",
                &[&ids],
            )
            .await
            .map_err(|e| TargetError::QueryFailed(e.to_string()))?;

        rows.iter().map(drug_from_row).collect()
    }

    fn describe(&self) -> String {
        format!("postgresql:{}", self.client.connection_string_safe())
    }
}

// Dropping the transaction before commit rolls back every insert below.

async fn insert_patient(tx: &Transaction<'_>, patient: &Patient) -> Result<PatientKey> {
    let row = PostgreSQLPatient::from_domain(patient)?;

    let inserted = tx
        .query_one(
            r#"
            INSERT INTO patient (tracnet_id, identifier_type_id, content, bridge_version)
            VALUES ($1, $2, $3, $4)
            RETURNING patient_id
            "#,
            &[
                &row.tracnet_id,
                &row.identifier_type_id,
                &row.content,
                &row.bridge_version,
            ],
        )
        .await
        .map_err(write_failed("patient"))?;

    inserted
        .try_get::<_, i64>("patient_id")
        .map_err(write_failed("patient"))
}

async fn insert_programs(
    tx: &Transaction<'_>,
    patient: PatientKey,
    programs: &[PatientProgram],
) -> Result<()> {
    for program in programs {
        let content = to_content(program)?;
        tx.execute(
            r#"
            INSERT INTO patient_program
                (patient_id, program_id, date_enrolled, date_completed, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            &[
                &patient,
                &program.program_id,
                &program.date_enrolled,
                &program.date_completed,
                &content,
            ],
        )
        .await
        .map_err(write_failed("patient program"))?;
    }
    Ok(())
}

async fn insert_encounters(
    tx: &Transaction<'_>,
    patient: PatientKey,
    encounters: &[Encounter],
) -> Result<()> {
    for encounter in encounters {
        let content = to_content(encounter)?;
        tx.execute(
            r#"
            INSERT INTO encounter
                (patient_id, encounter_kind, encounter_date, location_id, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            &[
                &patient,
                &encounter_kind_column(encounter),
                &encounter.encounter_date,
                &encounter.location_id,
                &content,
            ],
        )
        .await
        .map_err(write_failed("encounter"))?;
    }
    Ok(())
}

async fn insert_drug_orders(
    tx: &Transaction<'_>,
    patient: PatientKey,
    orders: &[DrugOrder],
) -> Result<()> {
    for order in orders {
        let content = to_content(order)?;
        tx.execute(
            r#"
            INSERT INTO drug_order
                (patient_id, concept_id, start_date, discontinued_date, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            &[
                &patient,
                &order.concept_id.0,
                &order.start_date,
                &order.discontinued_date,
                &content,
            ],
        )
        .await
        .map_err(write_failed("drug order"))?;
    }
    Ok(())
}
