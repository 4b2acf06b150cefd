use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::resource::{Deployable, ObjectKey};

use super::{DeployableStore, prepare_for_create};

/// In-process store, safe to share across threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<ObjectKey, Deployable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing objects, keeping their metadata as-is.
    pub fn with_deployables(deployables: impl IntoIterator<Item = Deployable>) -> Self {
        let objects = deployables
            .into_iter()
            .map(|d| (d.key(), d))
            .collect::<BTreeMap<_, _>>();
        Self {
            objects: RwLock::new(objects),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let objects = self.objects.read().map_err(|_| StoreError::Poisoned)?;
        Ok(objects.len())
    }
}

impl DeployableStore for MemoryStore {
    fn list(&self, namespace: Option<&str>) -> Result<Vec<Deployable>, StoreError> {
        let objects = self.objects.read().map_err(|_| StoreError::Poisoned)?;
        Ok(objects
            .values()
            .filter(|d| namespace.is_none_or(|ns| d.namespace() == ns))
            .cloned()
            .collect())
    }

    fn get(&self, key: &ObjectKey) -> Result<Option<Deployable>, StoreError> {
        let objects = self.objects.read().map_err(|_| StoreError::Poisoned)?;
        Ok(objects.get(key).cloned())
    }

    fn create(&self, deployable: Deployable) -> Result<Deployable, StoreError> {
        let mut objects = self.objects.write().map_err(|_| StoreError::Poisoned)?;
        let created = prepare_for_create(deployable, |key| objects.contains_key(key))?;
        objects.insert(created.key(), created.clone());
        Ok(created)
    }

    fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let mut objects = self.objects.write().map_err(|_| StoreError::Poisoned)?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }
}
