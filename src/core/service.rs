//! Transport-neutral entry points of the bridge
//!
//! [`BridgeService`] owns the process-wide pieces (stores, attached source,
//! task engine, mapping service) and exposes the operations a presentation
//! layer needs. Every entry point checks the operator's privilege first.
//!
//! Views that need a source or complete mappings return a [`ViewOutcome`]
//! telling the caller where to send the operator instead of an error.

use crate::adapters::database::Stores;
use crate::adapters::iqchart::{SourceDatabase, SourceRegistry, SourceSession};
use crate::core::access::Operator;
use crate::core::import::{ImportRunner, ImportTask, StatusDocument, TaskEngine};
use crate::core::mappings::{MappingService, Mappings};
use crate::core::translate::EntityBuilder;
use crate::domain::target::{ConceptRef, Drug, Obs, PatientRecord, PatientSummary};
use crate::domain::{ConceptId, ExitCode, Result, TracnetId};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Message shown when an incomplete mapping carries none of its own
pub const INCOMPLETE_MAPPINGS_MESSAGE: &str = "Incomplete entity mappings";

/// Result of a view operation
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome<T> {
    Ready(T),
    /// No IQChart database is attached
    AttachSource,
    /// A required mapping is unset
    ConfigureMappings { message: String },
}

impl<T> ViewOutcome<T> {
    /// Converts a translation result, turning `IncompleteMapping` into
    /// [`ViewOutcome::ConfigureMappings`]
    pub fn from_result(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Ready(value)),
            Err(e) if e.is_incomplete_mapping() => Ok(Self::ConfigureMappings {
                message: e
                    .mapping_message()
                    .unwrap_or(INCOMPLETE_MAPPINGS_MESSAGE)
                    .to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Everything shown for one patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetail {
    pub record: PatientRecord,
    /// The exit-reason observation, if the patient left care
    pub exit_obs: Option<Obs>,
    pub civil_status: Option<ConceptRef>,
}

impl From<PatientRecord> for PatientDetail {
    fn from(record: PatientRecord) -> Self {
        let exit_obs = record
            .find_obs(&ConceptRef::parse(ExitCode::MAPPED_QUESTION))
            .cloned();
        let civil_status = record.patient.civil_status.clone();
        Self {
            record,
            exit_obs,
            civil_status,
        }
    }
}

/// One drug mapping entry with the target drugs it reaches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugMappingEntry {
    pub legacy_drug_id: i32,
    pub concept_id: ConceptId,
    pub drugs: Vec<Drug>,
}

/// Facade over the bridge components
pub struct BridgeService {
    operator: Operator,
    stores: Stores,
    registry: SourceRegistry,
    engine: TaskEngine,
    mappings: OnceCell<Arc<MappingService>>,
    dry_run: bool,
}

impl BridgeService {
    pub fn new(operator: Operator, stores: Stores, dry_run: bool) -> Self {
        Self {
            operator,
            stores,
            registry: SourceRegistry::new(),
            engine: TaskEngine::new(),
            mappings: OnceCell::new(),
            dry_run,
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// The shared mapping service, loaded from the property store on first
    /// call
    pub async fn mappings(&self) -> Result<Arc<MappingService>> {
        self.operator.require_super_user()?;
        Ok(self.mapping_service().await)
    }

    async fn mapping_service(&self) -> Arc<MappingService> {
        self.mappings
            .get_or_init(|| async {
                tracing::debug!("Loading mapping service");
                Arc::new(MappingService::load(self.stores.properties.clone()).await)
            })
            .await
            .clone()
    }

    /// Replaces and persists the mappings
    pub async fn save_mappings(&self, mappings: Mappings) -> Result<()> {
        self.operator.require_super_user()?;
        self.mapping_service().await.update(mappings).await
    }

    /// Loads a snapshot file and makes it the attached source
    pub async fn attach_source(&self, path: impl AsRef<Path>) -> Result<Arc<SourceDatabase>> {
        self.operator.require_super_user()?;
        self.registry.attach(path).await
    }

    /// Attaches an already loaded database
    pub fn attach_database(&self, database: SourceDatabase) -> Result<Arc<SourceDatabase>> {
        self.operator.require_super_user()?;
        Ok(self.registry.attach_database(database))
    }

    /// Detaches the source, returning whether one was attached
    pub fn detach_source(&self) -> Result<bool> {
        self.operator.require_super_user()?;
        Ok(self.registry.detach())
    }

    pub fn source(&self) -> Result<Option<Arc<SourceDatabase>>> {
        self.operator.require_super_user()?;
        Ok(self.registry.current())
    }

    /// Preview rows for every source patient
    pub async fn preview(&self) -> Result<ViewOutcome<Vec<PatientSummary>>> {
        self.operator.require_super_user()?;
        let Some(database) = self.registry.current() else {
            return Ok(ViewOutcome::AttachSource);
        };
        let mappings = self.mapping_service().await.snapshot().await;

        let session = SourceSession::open(database);
        let result = EntityBuilder::new(&session, &mappings).patients();
        ViewOutcome::from_result(result)
    }

    /// Full translation of one patient
    pub async fn patient(&self, tracnet_id: TracnetId) -> Result<ViewOutcome<PatientDetail>> {
        self.operator.require_super_user()?;
        let Some(database) = self.registry.current() else {
            return Ok(ViewOutcome::AttachSource);
        };
        let mappings = self.mapping_service().await.snapshot().await;

        let session = SourceSession::open(database);
        let result = EntityBuilder::new(&session, &mappings)
            .record(tracnet_id)
            .map(PatientDetail::from);
        ViewOutcome::from_result(result)
    }

    /// Status document of the current import
    pub fn status(&self) -> Result<StatusDocument> {
        self.operator.require_super_user()?;
        Ok(StatusDocument::from_task(self.engine.current_task().as_deref()))
    }

    /// The most recently started import
    pub fn current_task(&self) -> Result<Option<Arc<ImportTask>>> {
        self.operator.require_super_user()?;
        Ok(self.engine.current_task())
    }

    /// Starts a background import of the attached source
    ///
    /// The scalar mappings are checked before any task is created.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ImportAlreadyRunning` if an import is running.
    pub async fn start_import(&self) -> Result<ViewOutcome<Arc<ImportTask>>> {
        self.operator.require_super_user()?;
        let Some(database) = self.registry.current() else {
            return Ok(ViewOutcome::AttachSource);
        };
        let mappings = self.mapping_service().await.snapshot().await;
        if let Err(e) = mappings.require_scalars() {
            return ViewOutcome::from_result(Err(e));
        }

        let runner = ImportRunner::new(
            database,
            self.stores.target.clone(),
            mappings,
            self.dry_run,
        );
        let task = self
            .engine
            .start(move |task| async move { runner.run(&task).await.map(|_| ()) })?;
        Ok(ViewOutcome::Ready(task))
    }

    /// Target drugs reached by each drug mapping entry
    pub async fn drug_mapping_report(&self) -> Result<ViewOutcome<Vec<DrugMappingEntry>>> {
        self.operator.require_super_user()?;
        let mappings = self.mapping_service().await.snapshot().await;
        let table = match mappings.drug_table() {
            Ok(table) => table,
            Err(e) => return ViewOutcome::from_result(Err(e)),
        };

        let drugs = self
            .stores
            .target
            .find_drugs_by_concepts(&table.concepts())
            .await?;

        let entries = table
            .iter()
            .map(|(legacy_drug_id, concept_id)| DrugMappingEntry {
                legacy_drug_id,
                concept_id,
                drugs: drugs
                    .iter()
                    .filter(|d| d.concept_id == concept_id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(ViewOutcome::Ready(entries))
    }

    /// Checks the target store is reachable
    pub async fn test_target(&self) -> Result<()> {
        self.operator.require_super_user()?;
        self.stores.target.test_connection().await.map_err(|e| {
            tracing::error!(
                target_store = %self.stores.target.describe(),
                error = %e,
                "Target store unreachable"
            );
            e
        })
    }
}

impl std::fmt::Debug for BridgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeService")
            .field("operator", &self.operator)
            .field("target", &self.stores.target.describe())
            .field("properties", &self.stores.properties.describe())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::memory::{MemoryPropertyStore, MemoryTargetStore};
    use crate::core::access::SUPER_USER_ROLE;
    use crate::domain::{BridgeError, MappingField};

    fn service() -> BridgeService {
        let stores = Stores {
            properties: Arc::new(MemoryPropertyStore::new()),
            target: Arc::new(MemoryTargetStore::new()),
        };
        BridgeService::new(
            Operator::new("admin", vec![SUPER_USER_ROLE.to_string()]),
            stores,
            false,
        )
    }

    #[test]
    fn test_from_result_fallback_message() {
        let outcome: ViewOutcome<()> =
            ViewOutcome::from_result(Err(BridgeError::IncompleteMapping {
                field: None,
                message: None,
            }))
            .unwrap();
        assert_eq!(
            outcome,
            ViewOutcome::ConfigureMappings {
                message: INCOMPLETE_MAPPINGS_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn test_from_result_keeps_other_errors() {
        let result: Result<ViewOutcome<()>> =
            ViewOutcome::from_result(Err(BridgeError::Other("boom".to_string())));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_result_uses_error_message() {
        let outcome: ViewOutcome<()> = ViewOutcome::from_result(Err(BridgeError::incomplete(
            MappingField::HivProgram,
            "pick a program",
        )))
        .unwrap();
        assert_eq!(
            outcome,
            ViewOutcome::ConfigureMappings {
                message: "pick a program".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_preview_without_source() {
        assert_eq!(service().preview().await.unwrap(), ViewOutcome::AttachSource);
    }

    #[tokio::test]
    async fn test_start_import_checks_mappings_first() {
        let service = service();
        service
            .attach_database(SourceDatabase::from_snapshot("empty", Default::default()).unwrap())
            .unwrap();

        let outcome = service.start_import().await.unwrap();
        assert!(matches!(outcome, ViewOutcome::ConfigureMappings { .. }));
        assert!(service.current_task().unwrap().is_none());
    }
}
