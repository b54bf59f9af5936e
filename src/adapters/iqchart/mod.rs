//! IQChart legacy source
//!
//! - [`SourceRegistry`] holds the attached database, if any
//! - [`SourceSession`] is a scoped read handle opened per unit of work

pub mod database;
pub mod session;

pub use database::{Snapshot, SourceDatabase, SourceRegistry};
pub use session::SourceSession;
