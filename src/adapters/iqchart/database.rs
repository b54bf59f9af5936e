//! Attached IQChart databases
//!
//! An IQChart database is read from a JSON snapshot of its patient, visit and
//! drug tables. At most one database is attached at a time; the registry
//! hands out shared references to it.

use crate::domain::legacy::{LegacyDrugOrder, LegacyPatient, LegacyVisit};
use crate::domain::{Result, SourceError, TracnetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// JSON snapshot of the IQChart tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub patients: Vec<LegacyPatient>,
    #[serde(default)]
    pub visits: Vec<LegacyVisit>,
    #[serde(default)]
    pub drug_orders: Vec<LegacyDrugOrder>,
}

/// A loaded IQChart database
#[derive(Debug)]
pub struct SourceDatabase {
    name: String,
    attached_at: DateTime<Utc>,
    patients: BTreeMap<TracnetId, LegacyPatient>,
    visits: Vec<LegacyVisit>,
    drug_orders: Vec<LegacyDrugOrder>,
    pub(super) open_sessions: AtomicUsize,
}

impl SourceDatabase {
    /// Builds a database from snapshot tables
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unreadable` if two patients share a TRACnet ID.
    pub fn from_snapshot(name: impl Into<String>, snapshot: Snapshot) -> Result<Self> {
        let name = name.into();
        let mut patients = BTreeMap::new();
        for patient in snapshot.patients {
            let id = patient.tracnet_id;
            if patients.insert(id, patient).is_some() {
                return Err(SourceError::Unreadable(format!(
                    "{name}: duplicate TRACnet ID {id}"
                ))
                .into());
            }
        }

        Ok(Self {
            name,
            attached_at: Utc::now(),
            patients,
            visits: snapshot.visits,
            drug_orders: snapshot.drug_orders,
            open_sessions: AtomicUsize::new(0),
        })
    }

    /// Loads a snapshot file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(path.display().to_string()).into())
            }
            Err(e) => {
                return Err(SourceError::Unreadable(format!("{}: {}", path.display(), e)).into())
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| SourceError::Unreadable(format!("{}: {}", path.display(), e)))?;

        Self::from_snapshot(path.display().to_string(), snapshot)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attached_at(&self) -> DateTime<Utc> {
        self.attached_at
    }

    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }

    /// Number of sessions currently open on this database
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub(super) fn patients(&self) -> impl Iterator<Item = &LegacyPatient> {
        self.patients.values()
    }

    pub(super) fn patient(&self, id: TracnetId) -> Option<&LegacyPatient> {
        self.patients.get(&id)
    }

    pub(super) fn visits_of(&self, id: TracnetId) -> impl Iterator<Item = &LegacyVisit> {
        self.visits.iter().filter(move |v| v.tracnet_id == id)
    }

    pub(super) fn drug_orders_of(&self, id: TracnetId) -> impl Iterator<Item = &LegacyDrugOrder> {
        self.drug_orders.iter().filter(move |o| o.tracnet_id == id)
    }
}

/// Holds the currently attached database, if any
#[derive(Debug, Default)]
pub struct SourceRegistry {
    current: RwLock<Option<Arc<SourceDatabase>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the snapshot at `path` and makes it the attached database
    ///
    /// The previous database stays alive until its open sessions are closed.
    pub async fn attach(&self, path: impl AsRef<Path>) -> Result<Arc<SourceDatabase>> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let database = Arc::new(SourceDatabase::load(&path).await?);
        tracing::info!(
            source = %database.name(),
            patients = database.patient_count(),
            "IQChart database attached"
        );
        self.replace(Some(database.clone()));
        Ok(database)
    }

    /// Attaches an already loaded database
    pub fn attach_database(&self, database: SourceDatabase) -> Arc<SourceDatabase> {
        let database = Arc::new(database);
        self.replace(Some(database.clone()));
        database
    }

    /// Detaches the current database
    ///
    /// Returns whether one was attached.
    pub fn detach(&self) -> bool {
        let previous = self.replace(None);
        if let Some(ref db) = previous {
            tracing::info!(source = %db.name(), "IQChart database detached");
        }
        previous.is_some()
    }

    /// The attached database, `None` when nothing is attached
    pub fn current(&self) -> Option<Arc<SourceDatabase>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, database: Option<Arc<SourceDatabase>>) -> Option<Arc<SourceDatabase>> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "patients": [
            {"tracnet_id": 2, "first_name": "Marie", "last_name": "Mukamana"},
            {"tracnet_id": 1, "first_name": "Jean", "last_name": "Habimana"}
        ],
        "visits": [{"tracnet_id": 1, "visit_date": "2010-02-01"}]
    }"#;

    fn snapshot_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let file = snapshot_file(SNAPSHOT);
        let db = SourceDatabase::load(file.path()).await.unwrap();

        assert_eq!(db.patient_count(), 2);
        let ids: Vec<i32> = db.patients().map(|p| p.tracnet_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(db.visits_of(TracnetId::new(1).unwrap()).count(), 1);
        assert_eq!(db.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_load_missing_snapshot() {
        let err = SourceDatabase::load("/nonexistent/iqchart.json")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::domain::BridgeError::Source(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_unreadable_snapshot() {
        let file = snapshot_file("{ not json");
        let err = SourceDatabase::load(file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::domain::BridgeError::Source(SourceError::Unreadable(_))
        ));
    }

    #[test]
    fn test_duplicate_tracnet_id_rejected() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"patients": [
                {"tracnet_id": 1, "first_name": "A", "last_name": "B"},
                {"tracnet_id": 1, "first_name": "C", "last_name": "D"}
            ]}"#,
        )
        .unwrap();
        assert!(SourceDatabase::from_snapshot("dup", snapshot).is_err());
    }

    #[tokio::test]
    async fn test_registry_attach_detach() {
        let registry = SourceRegistry::new();
        assert!(registry.current().is_none());
        assert!(!registry.detach());

        let file = snapshot_file(SNAPSHOT);
        let attached = registry.attach(file.path()).await.unwrap();
        let current = registry.current().unwrap();
        assert!(Arc::ptr_eq(&attached, &current));

        assert!(registry.detach());
        assert!(registry.current().is_none());
    }
}
