//! Import task state
//!
//! An [`ImportTask`] is written by exactly one background worker and read by
//! any number of pollers. Counters are atomics; the lifecycle state goes
//! through a `watch` channel so callers can also await completion.

use crate::domain::{TaskId, TracnetId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Lifecycle of an import task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Running,
    Completed,
    Failed,
}

impl TaskState {
    /// Whether the task has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Error that ended a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    /// Stable error kind, e.g. `TargetError` or `Panic`
    pub kind: String,
    pub message: Option<String>,
}

/// Patient left out of an import because its mappings were incomplete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPatient {
    pub tracnet_id: TracnetId,
    pub message: String,
}

/// One run of the bulk import
#[derive(Debug)]
pub struct ImportTask {
    id: TaskId,
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    state: watch::Sender<TaskState>,
    failure: Mutex<Option<TaskFailure>>,
    progress: AtomicU32,
    imported_patients: AtomicU64,
    imported_encounters: AtomicU64,
    duplicates: AtomicU64,
    skipped: Mutex<Vec<SkippedPatient>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ImportTask {
    /// Creates a running task with zero progress
    pub fn new() -> Self {
        let (state, _) = watch::channel(TaskState::Running);
        Self {
            id: TaskId::generate(),
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            state,
            failure: Mutex::new(None),
            progress: AtomicU32::new(0),
            imported_patients: AtomicU64::new(0),
            imported_encounters: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            skipped: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        *lock(&self.finished_at)
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TaskState::Running
    }

    /// Whether the task has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// The captured failure, if the task failed
    pub fn failure(&self) -> Option<TaskFailure> {
        lock(&self.failure).clone()
    }

    /// Percentage of patients processed, 0 to 100
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn imported_patients(&self) -> u64 {
        self.imported_patients.load(Ordering::SeqCst)
    }

    pub fn imported_encounters(&self) -> u64 {
        self.imported_encounters.load(Ordering::SeqCst)
    }

    /// Patients already present in the target
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> Vec<SkippedPatient> {
        lock(&self.skipped).clone()
    }

    /// Waits until the task is terminal and returns its final state
    pub async fn wait(&self) -> TaskState {
        let mut receiver = self.state.subscribe();
        let state = match receiver.wait_for(TaskState::is_terminal).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        state
    }

    /// Raises the progress; lower values are ignored
    pub(crate) fn set_progress(&self, percent: u32) {
        self.progress.fetch_max(percent.min(100), Ordering::SeqCst);
    }

    // Patients are counted before their encounters. Readers load encounters
    // first, so they never see encounters of a patient not yet counted.
    pub(crate) fn record_imported(&self, encounters: usize) {
        self.imported_patients.fetch_add(1, Ordering::SeqCst);
        self.imported_encounters
            .fetch_add(encounters as u64, Ordering::SeqCst);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_skipped(&self, tracnet_id: TracnetId, message: String) {
        lock(&self.skipped).push(SkippedPatient {
            tracnet_id,
            message,
        });
    }

    pub(crate) fn complete(&self) {
        self.finish(TaskState::Completed, None);
    }

    pub(crate) fn fail(&self, kind: impl Into<String>, message: Option<String>) {
        self.finish(
            TaskState::Failed,
            Some(TaskFailure {
                kind: kind.into(),
                message,
            }),
        );
    }

    // Failure and finish time are stored before the state flips so a poller
    // that sees a terminal state also sees them. Only the first call wins.
    fn finish(&self, state: TaskState, failure: Option<TaskFailure>) {
        if self.is_terminal() {
            return;
        }
        *lock(&self.failure) = failure;
        *lock(&self.finished_at) = Some(Utc::now());
        self.state.send_if_modified(|current| {
            if current.is_terminal() {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

impl Default for ImportTask {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress percentage after `done` of `total` patients
pub(crate) fn progress_percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u32
}
