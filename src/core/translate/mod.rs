//! Legacy to target translation

pub mod builder;

pub use builder::{concepts, EntityBuilder};
