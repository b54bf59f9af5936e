//! Bulk translate-and-write of every source patient
//!
//! The runner is the body of an import task. It owns everything it needs
//! (source, target, mapping snapshot) so it can be moved onto a background
//! tokio task.

use crate::adapters::database::traits::TargetStore;
use crate::adapters::iqchart::{SourceDatabase, SourceSession};
use crate::core::import::summary::ImportSummary;
use crate::core::import::task::{progress_percent, ImportTask};
use crate::core::mappings::Mappings;
use crate::core::translate::EntityBuilder;
use crate::domain::target::PatientRecord;
use crate::domain::{Result, TracnetId};
use std::sync::Arc;
use std::time::Instant;

/// Imports all patients of one source database into a target store
pub struct ImportRunner {
    source: Arc<SourceDatabase>,
    target: Arc<dyn TargetStore>,
    mappings: Mappings,
    dry_run: bool,
}

impl ImportRunner {
    pub fn new(
        source: Arc<SourceDatabase>,
        target: Arc<dyn TargetStore>,
        mappings: Mappings,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            target,
            mappings,
            dry_run,
        }
    }

    /// Runs the import, reporting to `task`
    ///
    /// A patient already present in the target is counted as a duplicate.
    /// A patient whose record needs an unset mapping is skipped and recorded
    /// on the task. Any other error stops the run; patients written before
    /// it stay written.
    pub async fn run(&self, task: &ImportTask) -> Result<ImportSummary> {
        let started = Instant::now();
        let session = SourceSession::open(self.source.clone());
        let builder = EntityBuilder::new(&session, &self.mappings);

        let ids: Vec<TracnetId> = session.patients().iter().map(|p| p.tracnet_id).collect();
        let total = ids.len();
        crate::log_import_start!(task.id(), total, self.dry_run);

        for (index, tracnet_id) in ids.into_iter().enumerate() {
            self.import_patient(task, &builder, tracnet_id).await?;
            task.set_progress(progress_percent(index + 1, total));
        }
        task.set_progress(100);

        let summary = ImportSummary::from_task(task, total, self.dry_run)
            .with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn import_patient(
        &self,
        task: &ImportTask,
        builder: &EntityBuilder<'_>,
        tracnet_id: TracnetId,
    ) -> Result<()> {
        if self.target.patient_exists(tracnet_id).await? {
            tracing::debug!(tracnet_id = %tracnet_id, "Patient already imported");
            task.record_duplicate();
            return Ok(());
        }

        let record = match builder.record(tracnet_id) {
            Ok(record) => record,
            Err(e) if e.is_incomplete_mapping() => {
                let message = e
                    .mapping_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                crate::log_patient_skipped!(tracnet_id, message);
                task.record_skipped(tracnet_id, message);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !self.dry_run {
            self.write(&record).await?;
        }
        task.record_imported(record.encounters.len());
        Ok(())
    }

    async fn write(&self, record: &PatientRecord) -> Result<()> {
        let key = self.target.save_record(record).await?;

        tracing::debug!(
            tracnet_id = %record.patient.tracnet_id,
            patient_key = key,
            encounters = record.encounters.len(),
            "Patient imported"
        );
        Ok(())
    }
}
