//! Poll-based status document
//!
//! The document is the wire shape pollers read:
//!
//! ```json
//! {"task": {"completed": false, "exception": null, "exceptionMessage": null,
//!           "progress": 40, "importedPatients": 12, "importedEncounters": 57}}
//! ```
//!
//! or `{"task": null}` when no import has been started.

use crate::core::import::task::ImportTask;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub task: Option<TaskStatus>,
}

/// Status of the current task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// True once the task is terminal, successful or not
    pub completed: bool,
    /// Failure kind, when the task failed
    pub exception: Option<String>,
    pub exception_message: Option<String>,
    pub progress: u32,
    pub imported_patients: u64,
    pub imported_encounters: u64,
}

impl StatusDocument {
    pub fn from_task(task: Option<&ImportTask>) -> Self {
        Self {
            task: task.map(TaskStatus::from),
        }
    }

    /// Whether polling can stop
    pub fn is_terminal(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.completed)
    }
}

impl From<&ImportTask> for TaskStatus {
    fn from(task: &ImportTask) -> Self {
        // The failure is stored before the state turns terminal, so it is
        // read after the state. Encounters are read before patients for the
        // same reason.
        let completed = task.is_terminal();
        let failure = task.failure();
        let imported_encounters = task.imported_encounters();
        let imported_patients = task.imported_patients();
        Self {
            completed,
            exception: failure.as_ref().map(|f| f.kind.clone()),
            exception_message: failure.and_then(|f| f.message),
            progress: task.progress(),
            imported_patients,
            imported_encounters,
        }
    }
}
