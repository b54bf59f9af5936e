//! Background import of IQChart patients
//!
//! - [`task`] - task state, progress and counters
//! - [`engine`] - runs at most one task at a time on the tokio runtime
//! - [`runner`] - the translate-and-write body of a task
//! - [`status`] - the status document pollers read
//! - [`summary`] - end-of-run report

pub mod engine;
pub mod runner;
pub mod status;
pub mod summary;
pub mod task;

pub use engine::TaskEngine;
pub use runner::ImportRunner;
pub use status::{StatusDocument, TaskStatus};
pub use summary::ImportSummary;
pub use task::{ImportTask, SkippedPatient, TaskFailure, TaskState};
