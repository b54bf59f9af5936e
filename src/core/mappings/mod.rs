//! Administrator-configurable entity mappings
//!
//! - [`Mappings`]: the mapping values with explicit load/save against a
//!   [`PropertyStore`](crate::adapters::database::PropertyStore)
//! - [`DrugMappingTable`]: the parsed legacy drug table
//! - [`MappingService`]: the shared, process-wide holder

pub mod configuration;
pub mod drugs;
pub mod service;

pub use configuration::{keys, Mappings, UNSET};
pub use drugs::DrugMappingTable;
pub use service::MappingService;
