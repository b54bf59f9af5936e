//! File-backed stores

pub mod properties;

pub use properties::FilePropertyStore;
