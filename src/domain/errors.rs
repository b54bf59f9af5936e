//! Domain error types
//!
//! This module defines the error hierarchy for IQBridge. All errors are
//! domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// Mapping fields an administrator has to fill in before translation can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingField {
    /// Patient identifier type used for TRACnet IDs
    TracnetIdType,
    /// Default address province
    AddressProvince,
    /// HIV program
    HivProgram,
    /// TB program
    TbProgram,
    /// Site location
    SiteLocation,
    /// Legacy drug to target concept table
    DrugMappings,
}

impl MappingField {
    /// All fields, in display order
    pub const ALL: [MappingField; 6] = [
        MappingField::TracnetIdType,
        MappingField::AddressProvince,
        MappingField::HivProgram,
        MappingField::TbProgram,
        MappingField::SiteLocation,
        MappingField::DrugMappings,
    ];

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            MappingField::TracnetIdType => "TRACnet ID identifier type",
            MappingField::AddressProvince => "address province",
            MappingField::HivProgram => "HIV program",
            MappingField::TbProgram => "TB program",
            MappingField::SiteLocation => "site location",
            MappingField::DrugMappings => "drug mappings",
        }
    }
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main IQBridge error type
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A translation step needs a mapping that is still unset
    #[error("Incomplete mapping for {}: {}", .field.map(|f| f.label()).unwrap_or("entity mappings"), .message.as_deref().unwrap_or("not configured"))]
    IncompleteMapping {
        /// Offending field, when known
        field: Option<MappingField>,
        /// Optional operator-facing message
        message: Option<String>,
    },

    /// Legacy source errors
    #[error("IQChart source error: {0}")]
    Source(#[from] SourceError),

    /// Target system errors
    #[error("Target store error: {0}")]
    Target(#[from] TargetError),

    /// Stored legacy code with no known meaning
    #[error("Invalid {kind} code: {code}")]
    InvalidCode {
        /// Code table name
        kind: &'static str,
        /// Raw stored value
        code: u8,
    },

    /// Elevated privilege check failed
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// An import is already running
    #[error("An import is already running (task {task_id})")]
    ImportAlreadyRunning {
        /// Running task ID
        task_id: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database-related errors (generic)
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BridgeError {
    /// Shorthand for an incomplete mapping on a known field
    pub fn incomplete(field: MappingField, message: impl Into<String>) -> Self {
        BridgeError::IncompleteMapping {
            field: Some(field),
            message: Some(message.into()),
        }
    }

    /// Stable failure kind recorded on import tasks
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::IncompleteMapping { .. } => "IncompleteMapping",
            BridgeError::Source(_) => "SourceError",
            BridgeError::Target(_) => "TargetError",
            BridgeError::InvalidCode { .. } => "InvalidCode",
            BridgeError::AccessDenied(_) => "AccessDenied",
            BridgeError::ImportAlreadyRunning { .. } => "ImportAlreadyRunning",
            BridgeError::Configuration(_) => "ConfigurationError",
            BridgeError::Database(_) => "DatabaseError",
            BridgeError::Serialization(_) => "SerializationError",
            BridgeError::Io(_) => "IoError",
            BridgeError::Other(_) => "Error",
        }
    }

    /// Whether this is the recoverable incomplete-mapping condition
    pub fn is_incomplete_mapping(&self) -> bool {
        matches!(self, BridgeError::IncompleteMapping { .. })
    }

    /// Operator-facing message of an incomplete mapping, if any
    pub fn mapping_message(&self) -> Option<&str> {
        match self {
            BridgeError::IncompleteMapping { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// IQChart source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// No database has been attached
    #[error("No IQChart database attached")]
    NotAttached,

    /// Snapshot file missing
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// Snapshot could not be parsed
    #[error("Unreadable snapshot: {0}")]
    Unreadable(String),

    /// Patient does not exist in the source
    #[error("Patient not found: TRACnet ID {0}")]
    PatientNotFound(i32),
}

/// Target store errors
#[derive(Debug, Error)]
pub enum TargetError {
    /// Failed to connect to the target store
    #[error("Failed to connect to target store: {0}")]
    ConnectionFailed(String),

    /// Failed to write an entity
    #[error("Failed to write {entity}: {message}")]
    WriteFailed {
        /// Entity kind (patient, encounter, ...)
        entity: &'static str,
        /// Underlying message
        message: String,
    },

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Configuration(format!("TOML parse error: {err}"))
    }
}
