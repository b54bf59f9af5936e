//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that cross the legacy/target boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// TRACnet identifier of a legacy IQChart patient
///
/// # Examples
///
/// ```
/// use iqbridge::domain::ids::TracnetId;
/// use std::str::FromStr;
///
/// let id = TracnetId::from_str("100123").unwrap();
/// assert_eq!(id.value(), 100123);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TracnetId(i32);

impl TracnetId {
    /// Creates a new TracnetId
    ///
    /// # Returns
    ///
    /// Returns `Ok(TracnetId)` if the ID is positive, `Err` otherwise
    pub fn new(id: i32) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("TRACnet ID must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw value
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TracnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TracnetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid TRACnet ID: '{s}'"))?;
        Self::new(id)
    }
}

impl TryFrom<i32> for TracnetId {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TracnetId> for i32 {
    fn from(id: TracnetId) -> Self {
        id.0
    }
}

/// Concept ID in the target dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub i32);

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an import task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh random task ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
