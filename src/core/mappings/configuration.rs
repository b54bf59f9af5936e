//! Administrator mapping values
//!
//! [`Mappings`] is a plain value: getters and setters perform no validation.
//! Completeness is checked where a value is consumed, through the
//! `require_*` helpers, which fail with `IncompleteMapping`.

use crate::adapters::database::traits::PropertyStore;
use crate::core::mappings::drugs::DrugMappingTable;
use crate::domain::{BridgeError, MappingField, Result};
use serde::Serialize;

/// Marker for an unset integer selector
pub const UNSET: i32 = -1;

/// Property keys
pub mod keys {
    pub const TRACNET_ID_TYPE_ID: &str = "iqbridge.tracnet_id_type_id";
    pub const ADDRESS_PROVINCE: &str = "iqbridge.address_province";
    pub const HIV_PROGRAM_ID: &str = "iqbridge.hiv_program_id";
    pub const TB_PROGRAM_ID: &str = "iqbridge.tb_program_id";
    pub const SITE_LOCATION_ID: &str = "iqbridge.site_location_id";
    pub const DRUG_MAPPINGS: &str = "iqbridge.drug_mappings";

    pub const ALL: [&str; 6] = [
        TRACNET_ID_TYPE_ID,
        ADDRESS_PROVINCE,
        HIV_PROGRAM_ID,
        TB_PROGRAM_ID,
        SITE_LOCATION_ID,
        DRUG_MAPPINGS,
    ];
}

/// Administrator-supplied mapping values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mappings {
    tracnet_id_type_id: i32,
    address_province: Option<String>,
    hiv_program_id: i32,
    tb_program_id: i32,
    site_location_id: i32,
    drug_mappings: String,
}

impl Default for Mappings {
    fn default() -> Self {
        Self {
            tracnet_id_type_id: UNSET,
            address_province: None,
            hiv_program_id: UNSET,
            tb_program_id: UNSET,
            site_location_id: UNSET,
            drug_mappings: String::new(),
        }
    }
}

async fn read_property(store: &dyn PropertyStore, name: &str) -> Option<String> {
    match store.get(name).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(property = %name, error = %e, "Failed to read property, treating as unset");
            None
        }
    }
}

async fn read_int(store: &dyn PropertyStore, name: &str) -> i32 {
    match read_property(store, name).await {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(property = %name, value = %raw, "Property is not an integer, treating as unset");
            UNSET
        }),
        None => UNSET,
    }
}

impl Mappings {
    /// Reads every field from the store
    ///
    /// Never fails: unreadable, missing or unparsable values fall back to
    /// their unset defaults.
    pub async fn load(store: &dyn PropertyStore) -> Self {
        let mappings = Self {
            tracnet_id_type_id: read_int(store, keys::TRACNET_ID_TYPE_ID).await,
            address_province: read_property(store, keys::ADDRESS_PROVINCE).await,
            hiv_program_id: read_int(store, keys::HIV_PROGRAM_ID).await,
            tb_program_id: read_int(store, keys::TB_PROGRAM_ID).await,
            site_location_id: read_int(store, keys::SITE_LOCATION_ID).await,
            drug_mappings: read_property(store, keys::DRUG_MAPPINGS)
                .await
                .unwrap_or_default(),
        };

        tracing::debug!(
            store = %store.describe(),
            missing = ?mappings.missing_fields(),
            "Mappings loaded"
        );
        mappings
    }

    /// Writes every field to the store
    ///
    /// Unset values are written as null.
    pub async fn save(&self, store: &dyn PropertyStore) -> Result<()> {
        fn int_value(value: i32) -> Option<String> {
            (value != UNSET).then(|| value.to_string())
        }

        let values = [
            (keys::TRACNET_ID_TYPE_ID, int_value(self.tracnet_id_type_id)),
            (keys::ADDRESS_PROVINCE, self.address_province.clone()),
            (keys::HIV_PROGRAM_ID, int_value(self.hiv_program_id)),
            (keys::TB_PROGRAM_ID, int_value(self.tb_program_id)),
            (keys::SITE_LOCATION_ID, int_value(self.site_location_id)),
            (keys::DRUG_MAPPINGS, Some(self.drug_mappings.clone())),
        ];

        for (name, value) in &values {
            store.set(name, value.as_deref()).await?;
        }

        tracing::info!(store = %store.describe(), "Mappings saved");
        Ok(())
    }

    pub fn tracnet_id_type_id(&self) -> i32 {
        self.tracnet_id_type_id
    }

    pub fn set_tracnet_id_type_id(&mut self, id: i32) {
        self.tracnet_id_type_id = id;
    }

    pub fn address_province(&self) -> Option<&str> {
        self.address_province.as_deref()
    }

    pub fn set_address_province(&mut self, province: Option<String>) {
        self.address_province = province;
    }

    pub fn hiv_program_id(&self) -> i32 {
        self.hiv_program_id
    }

    pub fn set_hiv_program_id(&mut self, id: i32) {
        self.hiv_program_id = id;
    }

    pub fn tb_program_id(&self) -> i32 {
        self.tb_program_id
    }

    pub fn set_tb_program_id(&mut self, id: i32) {
        self.tb_program_id = id;
    }

    pub fn site_location_id(&self) -> i32 {
        self.site_location_id
    }

    pub fn set_site_location_id(&mut self, id: i32) {
        self.site_location_id = id;
    }

    pub fn drug_mappings(&self) -> &str {
        &self.drug_mappings
    }

    pub fn set_drug_mappings(&mut self, mappings: impl Into<String>) {
        self.drug_mappings = mappings.into();
    }

    /// Identifier type for TRACnet IDs
    pub fn require_tracnet_id_type(&self) -> Result<i32> {
        require_selector(self.tracnet_id_type_id, MappingField::TracnetIdType)
    }

    pub fn require_address_province(&self) -> Result<&str> {
        self.address_province
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| not_configured(MappingField::AddressProvince))
    }

    pub fn require_hiv_program(&self) -> Result<i32> {
        require_selector(self.hiv_program_id, MappingField::HivProgram)
    }

    pub fn require_tb_program(&self) -> Result<i32> {
        require_selector(self.tb_program_id, MappingField::TbProgram)
    }

    pub fn require_site_location(&self) -> Result<i32> {
        require_selector(self.site_location_id, MappingField::SiteLocation)
    }

    /// Parses the drug mapping table
    pub fn drug_table(&self) -> Result<DrugMappingTable> {
        DrugMappingTable::parse(&self.drug_mappings)
    }

    /// Checks the mappings every patient needs
    ///
    /// The TB program and drug table are only needed by some patients and are
    /// checked during translation.
    pub fn require_scalars(&self) -> Result<()> {
        self.require_tracnet_id_type()?;
        self.require_address_province()?;
        self.require_hiv_program()?;
        self.require_site_location()?;
        Ok(())
    }

    /// Fields that are unset, in display order
    ///
    /// An empty drug table counts as missing.
    pub fn missing_fields(&self) -> Vec<MappingField> {
        MappingField::ALL
            .into_iter()
            .filter(|field| match field {
                MappingField::TracnetIdType => self.require_tracnet_id_type().is_err(),
                MappingField::AddressProvince => self.require_address_province().is_err(),
                MappingField::HivProgram => self.require_hiv_program().is_err(),
                MappingField::TbProgram => self.require_tb_program().is_err(),
                MappingField::SiteLocation => self.require_site_location().is_err(),
                MappingField::DrugMappings => {
                    self.drug_table().map(|t| t.is_empty()).unwrap_or(true)
                }
            })
            .collect()
    }
}

fn not_configured(field: MappingField) -> BridgeError {
    BridgeError::incomplete(field, format!("The {field} has not been configured"))
}

fn require_selector(value: i32, field: MappingField) -> Result<i32> {
    if value == UNSET {
        Err(not_configured(field))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::memory::MemoryPropertyStore;
    use async_trait::async_trait;

    fn complete() -> Mappings {
        let mut m = Mappings::default();
        m.set_tracnet_id_type_id(4);
        m.set_address_province(Some("Kigali".to_string()));
        m.set_hiv_program_id(1);
        m.set_tb_program_id(2);
        m.set_site_location_id(7);
        m.set_drug_mappings("12:795");
        m
    }

    #[tokio::test]
    async fn test_load_from_empty_store_gives_defaults() {
        let store = MemoryPropertyStore::new();
        let mappings = Mappings::load(&store).await;
        assert_eq!(mappings, Mappings::default());
        assert_eq!(mappings.missing_fields(), MappingField::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryPropertyStore::new();
        complete().save(&store).await.unwrap();

        let loaded = Mappings::load(&store).await;
        assert_eq!(loaded, complete());
        assert!(loaded.missing_fields().is_empty());
    }

    #[tokio::test]
    async fn test_unset_values_saved_as_null() {
        let store = MemoryPropertyStore::new();
        Mappings::default().save(&store).await.unwrap();

        assert!(store.contains(keys::HIV_PROGRAM_ID).await);
        assert_eq!(store.get(keys::HIV_PROGRAM_ID).await.unwrap(), None);
        assert_eq!(store.get(keys::ADDRESS_PROVINCE).await.unwrap(), None);
        assert_eq!(
            store.get(keys::DRUG_MAPPINGS).await.unwrap().as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn test_malformed_integer_loads_as_unset() {
        let store = MemoryPropertyStore::new();
        store.set(keys::HIV_PROGRAM_ID, Some("abc")).await.unwrap();
        store.set(keys::SITE_LOCATION_ID, Some(" 12 ")).await.unwrap();

        let loaded = Mappings::load(&store).await;
        assert_eq!(loaded.hiv_program_id(), UNSET);
        assert_eq!(loaded.site_location_id(), 12);
    }

    struct BrokenStore;

    #[async_trait]
    impl PropertyStore for BrokenStore {
        async fn get(&self, _name: &str) -> Result<Option<String>> {
            Err(BridgeError::Database("connection reset".to_string()))
        }

        async fn set(&self, _name: &str, _value: Option<&str>) -> Result<()> {
            Err(BridgeError::Database("connection reset".to_string()))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_never_fails() {
        let loaded = Mappings::load(&BrokenStore).await;
        assert_eq!(loaded, Mappings::default());
        assert!(complete().save(&BrokenStore).await.is_err());
    }

    #[test]
    fn test_require_helpers() {
        let mut m = complete();
        assert!(m.require_scalars().is_ok());

        m.set_site_location_id(UNSET);
        let err = m.require_scalars().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::IncompleteMapping {
                field: Some(MappingField::SiteLocation),
                ..
            }
        ));

        m.set_address_province(Some("  ".to_string()));
        assert!(m.require_address_province().is_err());
    }

    #[test]
    fn test_missing_fields_lists_empty_drug_table() {
        let mut m = complete();
        m.set_drug_mappings("");
        assert_eq!(m.missing_fields(), vec![MappingField::DrugMappings]);
    }
}
