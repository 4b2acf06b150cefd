//! Deployable storage backends.

mod manifest;
mod memory;

pub use manifest::{Manifest, ManifestStore};
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::resource::{Deployable, ObjectKey};

/// Length of the random suffix appended to `generate_name`.
const NAME_SUFFIX_LEN: usize = 5;

/// How many fresh names to try before giving up on a collision.
const NAME_ATTEMPTS: usize = 8;

/// Storage for Deployables.
///
/// Implementations return owned copies; callers never alias store state.
pub trait DeployableStore {
    /// List Deployables, optionally restricted to one namespace.
    fn list(&self, namespace: Option<&str>) -> Result<Vec<Deployable>, StoreError>;

    fn get(&self, key: &ObjectKey) -> Result<Option<Deployable>, StoreError>;

    /// Persist a new Deployable, allocating a name from `generate_name` when
    /// `name` is empty. Returns the stored object.
    fn create(&self, deployable: Deployable) -> Result<Deployable, StoreError>;

    fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;
}

impl<S: DeployableStore + ?Sized> DeployableStore for &S {
    fn list(&self, namespace: Option<&str>) -> Result<Vec<Deployable>, StoreError> {
        (**self).list(namespace)
    }

    fn get(&self, key: &ObjectKey) -> Result<Option<Deployable>, StoreError> {
        (**self).get(key)
    }

    fn create(&self, deployable: Deployable) -> Result<Deployable, StoreError> {
        (**self).create(deployable)
    }

    fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Fill in store-assigned metadata for a Deployable about to be created.
pub(crate) fn prepare_for_create(
    mut deployable: Deployable,
    exists: impl Fn(&ObjectKey) -> bool,
) -> Result<Deployable, StoreError> {
    if deployable.metadata.namespace.is_empty() {
        return Err(StoreError::Invalid("namespace is required".to_string()));
    }

    if deployable.metadata.name.is_empty() {
        let prefix = deployable
            .metadata
            .generate_name
            .clone()
            .filter(|g| !g.is_empty())
            .ok_or_else(|| StoreError::Invalid("name or generate_name is required".to_string()))?;

        let name = (0..NAME_ATTEMPTS)
            .map(|_| format!("{}{}", prefix, random_suffix()))
            .find(|candidate| {
                !exists(&ObjectKey::new(
                    deployable.metadata.namespace.clone(),
                    candidate.clone(),
                ))
            })
            .ok_or_else(|| {
                StoreError::Unavailable(format!("could not allocate a unique name for {}", prefix))
            })?;
        deployable.metadata.name = name;
    } else if exists(&deployable.key()) {
        return Err(StoreError::AlreadyExists(deployable.key()));
    }

    deployable.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
    deployable.metadata.creation_timestamp = Some(chrono::Utc::now());
    Ok(deployable)
}

fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(NAME_SUFFIX_LEN);
    suffix
}
