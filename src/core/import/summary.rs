//! Import summary and reporting

use crate::core::import::task::{ImportTask, SkippedPatient};
use crate::domain::TaskId;
use std::time::Duration;

/// Outcome of one import run
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub task_id: TaskId,

    /// Patients found in the source
    pub total_patients: usize,

    pub imported_patients: u64,

    pub imported_encounters: u64,

    /// Patients already present in the target
    pub duplicates_skipped: u64,

    /// Patients left out because of incomplete mappings
    pub skipped: Vec<SkippedPatient>,

    /// Whether writes were suppressed
    pub dry_run: bool,

    pub duration: Duration,
}

impl ImportSummary {
    /// Snapshot of the counters of `task`
    pub fn from_task(task: &ImportTask, total_patients: usize, dry_run: bool) -> Self {
        Self {
            task_id: task.id(),
            total_patients,
            imported_patients: task.imported_patients(),
            imported_encounters: task.imported_encounters(),
            duplicates_skipped: task.duplicates(),
            skipped: task.skipped(),
            dry_run,
            duration: Duration::from_secs(0),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// True when no patient was skipped for incomplete mappings
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn log_summary(&self) {
        crate::log_import_complete!(
            self.task_id,
            self.imported_patients,
            self.imported_encounters,
            self.duration
        );
        tracing::info!(
            task_id = %self.task_id,
            total_patients = self.total_patients,
            duplicates_skipped = self.duplicates_skipped,
            skipped = self.skipped.len(),
            dry_run = self.dry_run,
            "Import summary"
        );

        if !self.is_complete() {
            tracing::warn!(
                skipped = self.skipped.len(),
                "Import completed with skipped patients"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TracnetId;

    #[test]
    fn test_from_task_copies_counters() {
        let task = ImportTask::new();
        task.record_imported(4);
        task.record_duplicate();
        task.record_skipped(TracnetId::new(9).unwrap(), "no drug mapping".to_string());

        let summary =
            ImportSummary::from_task(&task, 3, true).with_duration(Duration::from_millis(20));
        assert_eq!(summary.task_id, task.id());
        assert_eq!(summary.imported_patients, 1);
        assert_eq!(summary.imported_encounters, 4);
        assert_eq!(summary.duplicates_skipped, 1);
        assert!(!summary.is_complete());
        assert!(summary.dry_run);
        assert_eq!(summary.duration, Duration::from_millis(20));
    }
}
