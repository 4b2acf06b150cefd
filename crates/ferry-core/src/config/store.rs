//! Locating and loading ferry.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{FerryConfig, parser, paths::resolve_config_path};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Locate the config from the working directory and user config dir.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let working_dir = std::env::current_dir().context("Could not determine working directory")?;
        let global_dir = dirs::config_dir();
        let config_path = resolve_config_path(explicit, &working_dir, global_dir.as_deref())
            .unwrap_or_else(|| working_dir.join(super::CONFIG_FILE_NAME));
        Ok(Self::from_path(config_path))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn load(&self) -> anyhow::Result<FerryConfig> {
        if !self.config_path.exists() {
            return Ok(FerryConfig::default());
        }
        parser::parse_ferry_toml(&self.config_path)
    }
}
