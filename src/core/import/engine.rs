//! Background execution of import tasks

use crate::core::import::task::ImportTask;
use crate::domain::{BridgeError, Result};
use std::any::Any;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinError;

/// Runs at most one import task at a time
///
/// The most recent task stays readable after it finished, until the next
/// one replaces it.
#[derive(Debug, Default)]
pub struct TaskEngine {
    current: RwLock<Option<Arc<ImportTask>>>,
}

impl TaskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently started task
    pub fn current_task(&self) -> Option<Arc<ImportTask>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Starts `work` as a new task on the tokio runtime
    ///
    /// `work` receives the task it reports progress to. A supervisor records
    /// its outcome: `Completed` on `Ok`, `Failed` with the error kind on
    /// `Err`, `Failed` with kind `Panic` if it panics.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ImportAlreadyRunning` while the current task is
    /// still running.
    pub fn start<F, Fut>(&self, work: F) -> Result<Arc<ImportTask>>
    where
        F: FnOnce(Arc<ImportTask>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(running) = current.as_ref().filter(|t| t.is_running()) {
            return Err(BridgeError::ImportAlreadyRunning {
                task_id: running.id().to_string(),
            });
        }

        let task = Arc::new(ImportTask::new());
        *current = Some(task.clone());
        drop(current);

        tracing::info!(task_id = %task.id(), "Import task started");

        let worker = tokio::spawn(work(task.clone()));
        let supervised = task.clone();
        tokio::spawn(async move {
            match worker.await {
                Ok(Ok(())) => {
                    supervised.complete();
                    tracing::info!(task_id = %supervised.id(), "Import task completed");
                }
                Ok(Err(e)) => {
                    crate::log_error_with_context!(&e, "Import task failed");
                    supervised.fail(e.kind(), Some(e.to_string()));
                }
                Err(join_error) => {
                    let (kind, message) = describe_join_error(join_error);
                    tracing::error!(
                        task_id = %supervised.id(),
                        kind = %kind,
                        message = ?message,
                        "Import task aborted"
                    );
                    supervised.fail(kind, message);
                }
            }
        });

        Ok(task)
    }
}

fn describe_join_error(error: JoinError) -> (&'static str, Option<String>) {
    if error.is_panic() {
        ("Panic", panic_message(error.into_panic()))
    } else {
        ("Cancelled", Some(error.to_string()))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Option<String> {
    match payload.downcast::<String>() {
        Ok(message) => Some(*message),
        Err(payload) => payload.downcast_ref::<&str>().map(|s| s.to_string()),
    }
}
