//! Store factory
//!
//! Builds the configured store implementations. When both stores live in
//! PostgreSQL they share one connection pool.

use crate::adapters::database::memory::{MemoryPropertyStore, MemoryTargetStore};
use crate::adapters::database::traits::{PropertyStore, TargetStore};
use crate::adapters::file::FilePropertyStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::{BridgeConfig, StoreBackend};
use crate::domain::{BridgeError, Result};
use std::sync::Arc;

/// The two stores used by the bridge
#[derive(Clone)]
pub struct Stores {
    pub properties: Arc<dyn PropertyStore>,
    pub target: Arc<dyn TargetStore>,
}

async fn postgres_adapter(config: &BridgeConfig) -> Result<Arc<PostgreSQLAdapter>> {
    let pg_config = config.postgresql.as_ref().ok_or_else(|| {
        BridgeError::Configuration("postgresql section is required for this backend".to_string())
    })?;

    tracing::info!("Creating PostgreSQL client");
    let client = PostgreSQLClient::new(pg_config.clone()).await?;
    client.ensure_schema().await?;
    Ok(Arc::new(PostgreSQLAdapter::new(client)))
}

/// Create the property store selected by `properties.backend`
pub async fn create_property_store(config: &BridgeConfig) -> Result<Arc<dyn PropertyStore>> {
    match config.properties.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryPropertyStore::new())),
        StoreBackend::File => {
            tracing::info!(path = %config.properties.path, "Using file property store");
            Ok(Arc::new(FilePropertyStore::new(&config.properties.path)))
        }
        StoreBackend::PostgreSQL => Ok(postgres_adapter(config).await? as Arc<dyn PropertyStore>),
    }
}

/// Create the target store selected by `target.backend`
pub async fn create_target_store(config: &BridgeConfig) -> Result<Arc<dyn TargetStore>> {
    match config.target.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryTargetStore::new())),
        StoreBackend::PostgreSQL => Ok(postgres_adapter(config).await? as Arc<dyn TargetStore>),
        StoreBackend::File => Err(BridgeError::Configuration(
            "target.backend cannot be 'file'".to_string(),
        )),
    }
}

/// Create both stores, reusing one PostgreSQL pool when possible
pub async fn create_stores(config: &BridgeConfig) -> Result<Stores> {
    if config.properties.backend == StoreBackend::PostgreSQL
        && config.target.backend == StoreBackend::PostgreSQL
    {
        let adapter = postgres_adapter(config).await?;
        return Ok(Stores {
            properties: adapter.clone() as Arc<dyn PropertyStore>,
            target: adapter as Arc<dyn TargetStore>,
        });
    }

    Ok(Stores {
        properties: create_property_store(config).await?,
        target: create_target_store(config).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[tokio::test]
    async fn test_memory_backends() {
        let config = parse_config(
            r#"
[application]
[properties]
backend = "memory"
[target]
backend = "memory"
"#,
        )
        .unwrap();

        let stores = create_stores(&config).await.unwrap();
        assert_eq!(stores.properties.describe(), "memory");
        assert_eq!(stores.target.describe(), "memory");
    }

    #[tokio::test]
    async fn test_file_property_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("props.toml");
        let config = parse_config(&format!(
            r#"
[application]
[properties]
backend = "file"
path = "{}"
[target]
backend = "memory"
"#,
            path.display()
        ))
        .unwrap();

        let store = create_property_store(&config).await.unwrap();
        assert!(store.describe().starts_with("file:"));
    }
}
