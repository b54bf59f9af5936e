//! Property store backed by a TOML file
//!
//! Properties are kept as a flat table of string values. TOML has no null,
//! so storing null removes the key.

use crate::adapters::database::traits::PropertyStore;
use crate::domain::context::ResultExt;
use crate::domain::{BridgeError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type PropertyTable = BTreeMap<String, String>;

/// TOML file property store
pub struct FilePropertyStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FilePropertyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<PropertyTable> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PropertyTable::new()),
            Err(e) => Err(BridgeError::Io(format!(
                "Failed to read properties file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_table(&self, table: &PropertyTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents = toml::to_string(table)
            .map_err(|e| BridgeError::Serialization(format!("Failed to encode properties: {e}")))?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write properties file {}", self.path.display()))
    }
}

#[async_trait]
impl PropertyStore for FilePropertyStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_table().await?.remove(name))
    }

    async fn set(&self, name: &str, value: Option<&str>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table().await?;
        match value {
            Some(value) => {
                table.insert(name.to_string(), value.to_string());
            }
            None => {
                table.remove(name);
            }
        }
        self.write_table(&table).await
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FilePropertyStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.get("iqbridge.hiv_program_id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_and_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("props.toml");
        let store = FilePropertyStore::new(&path);

        store.set("iqbridge.hiv_program_id", Some("1")).await.unwrap();
        store
            .set("iqbridge.drug_mappings", Some("12:795,\n13:630"))
            .await
            .unwrap();
        assert_eq!(
            store.get("iqbridge.drug_mappings").await.unwrap().as_deref(),
            Some("12:795,\n13:630")
        );

        store.set("iqbridge.hiv_program_id", None).await.unwrap();
        assert_eq!(store.get("iqbridge.hiv_program_id").await.unwrap(), None);

        let reopened = FilePropertyStore::new(&path);
        assert!(reopened
            .get("iqbridge.drug_mappings")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("props.toml");
        std::fs::write(&path, "not = valid = toml").unwrap();

        let store = FilePropertyStore::new(&path);
        assert!(store.get("anything").await.is_err());
    }
}
