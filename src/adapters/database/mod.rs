//! Store abstraction layer
//!
//! Trait-based access to the configuration store and the target record
//! system, with in-memory implementations and a configuration-driven factory.

pub mod factory;
pub mod memory;
pub mod traits;

pub use factory::{create_property_store, create_stores, create_target_store, Stores};
pub use memory::{MemoryPropertyStore, MemoryTargetStore};
pub use traits::{PatientKey, PropertyStore, TargetStore};
