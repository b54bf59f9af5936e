//! PostgreSQL integration
//!
//! Stores administrator mappings in `global_property` and imported entities
//! as JSONB documents. The schema lives in `migrations/`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLPatient;
