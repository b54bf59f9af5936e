//! Process-wide holder of the mapping configuration

use crate::adapters::database::traits::PropertyStore;
use crate::core::mappings::configuration::Mappings;
use crate::domain::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared mapping configuration
///
/// One instance per process, created by the owner of the property store and
/// handed out as `Arc<MappingService>`. Readers take a [`snapshot`] for a
/// unit of work so an administrator edit never changes mappings mid-import.
///
/// [`snapshot`]: MappingService::snapshot
pub struct MappingService {
    store: Arc<dyn PropertyStore>,
    current: RwLock<Mappings>,
}

impl MappingService {
    /// Loads the mappings from `store`
    pub async fn load(store: Arc<dyn PropertyStore>) -> Self {
        let current = Mappings::load(store.as_ref()).await;
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    /// Copy of the current mappings
    pub async fn snapshot(&self) -> Mappings {
        self.current.read().await.clone()
    }

    /// Replaces the mappings and persists them
    ///
    /// The in-memory value is only replaced once the store accepted it.
    pub async fn update(&self, mappings: Mappings) -> Result<()> {
        let mut current = self.current.write().await;
        mappings.save(self.store.as_ref()).await?;
        *current = mappings;
        Ok(())
    }

    /// Persists the current mappings
    pub async fn save(&self) -> Result<()> {
        let current = self.current.read().await;
        current.save(self.store.as_ref()).await
    }

    /// Re-reads the store, discarding the in-memory value
    pub async fn reload(&self) -> Mappings {
        let loaded = Mappings::load(self.store.as_ref()).await;
        *self.current.write().await = loaded.clone();
        loaded
    }
}
