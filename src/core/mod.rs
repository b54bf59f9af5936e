//! Core business logic for IQBridge
//!
//! # Modules
//!
//! - [`access`] - operator identity and the super-user check
//! - [`mappings`] - administrator mapping values and the shared mapping service
//! - [`translate`] - translation of IQChart records into target entities
//! - [`import`] - background import tasks, progress and status
//! - [`service`] - the facade presentation layers call
//!
//! # Import workflow
//!
//! 1. **Attach**: load an IQChart snapshot into the source registry
//! 2. **Configure**: fill in the mappings (identifier type, province,
//!    programs, site location, drug table)
//! 3. **Preview**: translate without writing to check the mappings
//! 4. **Import**: start the background task and poll its status document
//!
//! # Example
//!
//! ```rust,no_run
//! use iqbridge::adapters::database::{MemoryPropertyStore, MemoryTargetStore, Stores};
//! use iqbridge::config::AccessConfig;
//! use iqbridge::core::access::Operator;
//! use iqbridge::core::service::{BridgeService, ViewOutcome};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stores = Stores {
//!     properties: Arc::new(MemoryPropertyStore::new()),
//!     target: Arc::new(MemoryTargetStore::new()),
//! };
//! let service = BridgeService::new(Operator::from(&AccessConfig::default()), stores, false);
//!
//! service.attach_source("iqchart.json").await?;
//! if let ViewOutcome::Ready(task) = service.start_import().await? {
//!     task.wait().await;
//!     println!("{}", serde_json::to_string(&service.status()?)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod import;
pub mod mappings;
pub mod service;
pub mod translate;
