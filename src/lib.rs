// IQBridge - IQChart to OpenMRS import bridge
// Copyright (c) 2025 IQBridge Contributors
// Licensed under the MIT License

//! # IQBridge - IQChart to OpenMRS import bridge
//!
//! IQBridge reads patient, program, encounter and drug-order records from a
//! legacy IQChart database and writes them as the equivalent OpenMRS entities,
//! using mappings an administrator configures once per site.
//!
//! ## Overview
//!
//! This library provides:
//! - **Attaching** an IQChart database, read from a JSON snapshot
//! - **Mapping** legacy references (identifier type, province, programs,
//!   location, drugs) onto target references
//! - **Translating** legacy records into target entities, failing with a
//!   distinguished error when a mapping is missing
//! - **Importing** every patient in a background task with poll-based
//!   progress reporting
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (mappings, translation, import, service facade)
//! - [`adapters`] - External integrations (IQChart snapshots, stores)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iqbridge::adapters::database::create_stores;
//! use iqbridge::config::load_config;
//! use iqbridge::core::access::Operator;
//! use iqbridge::core::service::{BridgeService, ViewOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("iqbridge.toml")?;
//!     let stores = create_stores(&config).await?;
//!     let service = BridgeService::new(Operator::from(&config.access), stores, false);
//!
//!     service.attach_source("iqchart.json").await?;
//!     match service.start_import().await? {
//!         ViewOutcome::Ready(task) => {
//!             task.wait().await;
//!             println!("Imported {} patients", task.imported_patients());
//!         }
//!         ViewOutcome::ConfigureMappings { message } => println!("{message}"),
//!         ViewOutcome::AttachSource => println!("No IQChart database attached"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! IQBridge uses [`domain::BridgeError`] for all library errors. An unset
//! mapping is the `IncompleteMapping` variant, which views turn into a
//! redirect to the mapping configuration and imports turn into a skipped
//! patient.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
