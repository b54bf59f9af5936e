//! Scoped read access to an attached IQChart database

use crate::adapters::iqchart::database::SourceDatabase;
use crate::domain::legacy::{LegacyDrugOrder, LegacyPatient, LegacyVisit};
use crate::domain::{Result, SourceError, TracnetId};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Read handle on a [`SourceDatabase`] for one unit of work
///
/// Opening a session registers it with the database; dropping it (or calling
/// [`close`](Self::close)) releases it, whatever way the unit of work ends.
/// Sessions are deliberately not `Clone`.
#[derive(Debug)]
pub struct SourceSession {
    database: Arc<SourceDatabase>,
}

impl SourceSession {
    pub fn open(database: Arc<SourceDatabase>) -> Self {
        let open = database.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(source = %database.name(), open_sessions = open, "Source session opened");
        Self { database }
    }

    /// Releases the session now
    pub fn close(self) {
        drop(self);
    }

    pub fn database(&self) -> &SourceDatabase {
        &self.database
    }

    /// All patients, ordered by TRACnet ID
    pub fn patients(&self) -> Vec<&LegacyPatient> {
        self.database.patients().collect()
    }

    pub fn patient(&self, id: TracnetId) -> Result<&LegacyPatient> {
        self.database
            .patient(id)
            .ok_or_else(|| SourceError::PatientNotFound(id.value()).into())
    }

    /// Visits of a patient in snapshot order
    pub fn visits(&self, id: TracnetId) -> Vec<&LegacyVisit> {
        self.database.visits_of(id).collect()
    }

    pub fn drug_orders(&self, id: TracnetId) -> Vec<&LegacyDrugOrder> {
        self.database.drug_orders_of(id).collect()
    }
}

impl Drop for SourceSession {
    fn drop(&mut self) {
        let open = self.database.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(
            source = %self.database.name(),
            open_sessions = open,
            "Source session closed"
        );
    }
}
