#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use ferry_core::error::StoreError;
use ferry_core::resource::{Deployable, ObjectKey};
use ferry_core::store::{DeployableStore, MemoryStore};

/// Store wrapper that fails selected operations.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_delete: HashSet<ObjectKey>,
    pub deletes_attempted: Mutex<Vec<ObjectKey>>,
}

impl FlakyStore {
    pub fn new(deployables: impl IntoIterator<Item = Deployable>) -> Self {
        Self {
            inner: MemoryStore::with_deployables(deployables),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> Vec<ObjectKey> {
        self.deletes_attempted.lock().unwrap().clone()
    }
}

impl DeployableStore for FlakyStore {
    fn list(&self, namespace: Option<&str>) -> Result<Vec<Deployable>, StoreError> {
        if self.fail_list {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.list(namespace)
    }

    fn get(&self, key: &ObjectKey) -> Result<Option<Deployable>, StoreError> {
        self.inner.get(key)
    }

    fn create(&self, deployable: Deployable) -> Result<Deployable, StoreError> {
        if self.fail_create {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.create(deployable)
    }

    fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.deletes_attempted.lock().unwrap().push(key.clone());
        if self.fail_delete.contains(key) {
            return Err(StoreError::Unavailable(format!("cannot delete {}", key)));
        }
        self.inner.delete(key)
    }
}

pub fn key(s: &str) -> ObjectKey {
    s.parse().unwrap()
}
