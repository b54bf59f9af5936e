//! Legacy drug to target concept table
//!
//! Stored as a single property string of `legacy_drug_id:concept_id` pairs
//! separated by commas or newlines, e.g. `"12:795, 13:630"`.

use crate::domain::{BridgeError, ConceptId, MappingField, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Parsed drug mapping table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugMappingTable {
    entries: BTreeMap<i32, ConceptId>,
}

impl DrugMappingTable {
    /// Parses the stored encoding
    ///
    /// The empty string is an empty table.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::IncompleteMapping` on the drug mappings field,
    /// naming the first malformed or repeated entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use iqbridge::core::mappings::DrugMappingTable;
    /// use iqbridge::domain::ConceptId;
    ///
    /// let table = DrugMappingTable::parse("12:795, 13:630").unwrap();
    /// assert_eq!(table.concept_for(13), Some(ConceptId(630)));
    /// assert_eq!(table.concept_for(14), None);
    /// ```
    pub fn parse(encoded: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for entry in encoded
            .split([',', '\n'])
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            let (drug, concept) = entry
                .split_once(':')
                .and_then(|(d, c)| {
                    Some((d.trim().parse::<i32>().ok()?, c.trim().parse::<i32>().ok()?))
                })
                .ok_or_else(|| {
                    BridgeError::incomplete(
                        MappingField::DrugMappings,
                        format!("Malformed drug mapping entry '{entry}'"),
                    )
                })?;

            if entries.insert(drug, ConceptId(concept)).is_some() {
                return Err(BridgeError::incomplete(
                    MappingField::DrugMappings,
                    format!("Drug {drug} is mapped more than once"),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// Target concept of a legacy drug
    pub fn concept_for(&self, legacy_drug_id: i32) -> Option<ConceptId> {
        self.entries.get(&legacy_drug_id).copied()
    }

    /// Target concept of a legacy drug, or an incomplete mapping error
    pub fn require(&self, legacy_drug_id: i32) -> Result<ConceptId> {
        self.concept_for(legacy_drug_id).ok_or_else(|| {
            BridgeError::incomplete(
                MappingField::DrugMappings,
                format!("No drug mapping for IQChart drug {legacy_drug_id}"),
            )
        })
    }

    /// Pairs in legacy drug ID order
    pub fn iter(&self) -> impl Iterator<Item = (i32, ConceptId)> + '_ {
        self.entries.iter().map(|(d, c)| (*d, *c))
    }

    /// Distinct target concepts
    pub fn concepts(&self) -> Vec<ConceptId> {
        let mut concepts: Vec<ConceptId> = self.entries.values().copied().collect();
        concepts.sort();
        concepts.dedup();
        concepts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DrugMappingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (drug, concept) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{drug}:{concept}")?;
            first = false;
        }
        Ok(())
    }
}
