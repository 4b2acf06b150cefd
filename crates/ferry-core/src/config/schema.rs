//! Configuration schema for ferry.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default manifest location, relative to the working directory
pub const DEFAULT_MANIFEST: &str = "manifest.toml";

/// Root configuration structure for ferry.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FerryConfig {
    /// Manifest store holding Deployables and Channels
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Tracing filter used when RUST_LOG is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    /// Default CLI output format
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_manifest() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST)
}

impl Default for FerryConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            log_filter: None,
            output: OutputFormat::default(),
        }
    }
}

impl FerryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.manifest.as_os_str().is_empty() {
            anyhow::bail!("manifest path must not be empty");
        }
        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                anyhow::bail!("log_filter must not be blank when set");
            }
        }
        Ok(())
    }

    /// Resolve the manifest path against the directory holding the config.
    pub fn manifest_path(&self, base: &std::path::Path) -> PathBuf {
        if self.manifest.is_absolute() {
            self.manifest.clone()
        } else {
            base.join(&self.manifest)
        }
    }
}

/// CLI output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}
