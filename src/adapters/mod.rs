//! External system integrations for IQBridge
//!
//! - [`iqchart`] - the legacy IQChart source, read from JSON snapshots
//! - [`database`] - store traits, in-memory stores and the store factory
//! - [`file`] - TOML file property store
//! - [`postgresql`] - PostgreSQL property and target stores
//!
//! # Design Pattern
//!
//! Stores are trait objects ([`database::PropertyStore`],
//! [`database::TargetStore`]) picked from configuration by
//! [`database::create_stores`], so tests run against the in-memory
//! implementations.

pub mod database;
pub mod file;
pub mod iqchart;
pub mod postgresql;
