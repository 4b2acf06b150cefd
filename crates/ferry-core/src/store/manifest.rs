//! File-backed store over a TOML manifest of Deployables and Channels.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::parser::enhance_toml_error;
use crate::error::StoreError;
use crate::resource::{Channel, Deployable, ObjectKey};

use super::{DeployableStore, prepare_for_create};

/// On-disk manifest contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub deployables: Vec<Deployable>,

    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        let manifest: Manifest = toml::from_str(content)
            .map_err(|e| StoreError::Parse(enhance_toml_error(e, content).to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn to_toml(&self) -> Result<String, StoreError> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    /// Reject duplicate identities; everything else is taken as written.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for deployable in &self.deployables {
            if deployable.name().is_empty() || deployable.namespace().is_empty() {
                return Err(StoreError::Invalid(
                    "manifest deployables need both name and namespace".to_string(),
                ));
            }
            if !seen.insert(deployable.key()) {
                return Err(StoreError::AlreadyExists(deployable.key()));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for channel in &self.channels {
            if channel.name().is_empty() || channel.namespace().is_empty() {
                return Err(StoreError::Invalid(
                    "manifest channels need both name and namespace".to_string(),
                ));
            }
            if !seen.insert(channel.key()) {
                return Err(StoreError::Invalid(format!(
                    "duplicate channel in manifest: {}",
                    channel.key()
                )));
            }
        }
        Ok(())
    }

    pub fn channel(&self, key: &ObjectKey) -> Option<&Channel> {
        self.channels.iter().find(|c| c.key() == *key)
    }

    pub fn deployable(&self, key: &ObjectKey) -> Option<&Deployable> {
        self.deployables.iter().find(|d| d.key() == *key)
    }
}

/// Store that reads and rewrites a manifest file on every operation.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest; a missing file is an empty manifest.
    pub fn load(&self) -> Result<Manifest, StoreError> {
        if !self.path.exists() {
            return Ok(Manifest::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Manifest::parse(&content)
    }

    pub fn save(&self, manifest: &Manifest) -> Result<(), StoreError> {
        let content = manifest.to_toml()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn channels(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(self.load()?.channels)
    }

    pub fn channel(&self, key: &ObjectKey) -> Result<Option<Channel>, StoreError> {
        Ok(self.load()?.channel(key).cloned())
    }
}

impl DeployableStore for ManifestStore {
    fn list(&self, namespace: Option<&str>) -> Result<Vec<Deployable>, StoreError> {
        let manifest = self.load()?;
        Ok(manifest
            .deployables
            .into_iter()
            .filter(|d| namespace.is_none_or(|ns| d.namespace() == ns))
            .collect())
    }

    fn get(&self, key: &ObjectKey) -> Result<Option<Deployable>, StoreError> {
        Ok(self.load()?.deployable(key).cloned())
    }

    fn create(&self, deployable: Deployable) -> Result<Deployable, StoreError> {
        let mut manifest = self.load()?;
        let created = prepare_for_create(deployable, |key| manifest.deployable(key).is_some())?;
        manifest.deployables.push(created.clone());
        self.save(&manifest)?;
        Ok(created)
    }

    fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let mut manifest = self.load()?;
        let before = manifest.deployables.len();
        manifest.deployables.retain(|d| d.key() != *key);
        if manifest.deployables.len() == before {
            return Err(StoreError::NotFound(key.clone()));
        }
        self.save(&manifest)
    }
}
