//! Error context extension trait
//!
//! `.context()` / `.with_context()` for `Result<T, BridgeError>`, in the
//! manner of `anyhow::Context`, without leaving the domain error type.
//!
//! # Examples
//!
//! ```rust
//! use iqbridge::domain::Result;
//! use iqbridge::domain::context::ResultExt;
//!
//! fn read_snapshot(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read snapshot {path}"))
//! }
//! ```

use crate::domain::errors::BridgeError;
use crate::domain::result::Result;

/// Adds context to errors convertible into [`BridgeError`]
pub trait ResultExt<T> {
    /// Wraps the error with `context`, evaluated eagerly
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Wraps the error with the context returned by `f`, evaluated only on
    /// error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BridgeError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Incomplete mappings keep their variant so callers can still match on them
fn wrap(error: BridgeError, context: impl std::fmt::Display) -> BridgeError {
    match error {
        BridgeError::IncompleteMapping { .. } => error,
        BridgeError::Io(message) => BridgeError::Io(format!("{context}: {message}")),
        other => BridgeError::Other(format!("{context}: {other}")),
    }
}
