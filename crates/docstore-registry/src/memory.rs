//! In-memory registry for tests and single-process deployments.
//!
//! [`InMemoryRegistry`] stores entries in a `HashMap` protected by a
//! `RwLock`. Entries are lost when the registry is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use docstore_types::{DocumentId, Location};

use crate::error::{RegistryError, RegistryResult};
use crate::traits::LocationRegistry;

/// An in-memory implementation of [`LocationRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<DocumentId, Location>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entries.
    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> RegistryResult<std::sync::RwLockReadGuard<'_, HashMap<DocumentId, Location>>> {
        self.entries
            .read()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))
    }
}

impl LocationRegistry for InMemoryRegistry {
    fn exists(&self, id: DocumentId) -> RegistryResult<bool> {
        Ok(self.read()?.contains_key(&id))
    }

    fn save_path(&self, id: DocumentId, location: &Location) -> RegistryResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        entries.insert(id, location.clone());
        Ok(())
    }

    fn get_path(&self, id: DocumentId) -> RegistryResult<Location> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    fn ids(&self) -> RegistryResult<Vec<DocumentId>> {
        let mut ids: Vec<DocumentId> = self.read()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
