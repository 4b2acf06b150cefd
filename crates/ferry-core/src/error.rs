//! Error types for store access and projection maintenance.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::resource::ObjectKey;

/// Errors raised by a [`DeployableStore`](crate::store::DeployableStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("deployable not found: {0}")]
    NotFound(ObjectKey),

    #[error("deployable already exists: {0}")]
    AlreadyExists(ObjectKey),

    #[error("invalid deployable: {0}")]
    Invalid(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(String),

    #[error("failed to serialize manifest: {0}")]
    Serialize(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors raised by the resolver, projector and reconciler.
#[derive(Error, Debug)]
pub enum FerryError {
    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Cleanup(#[from] CleanupFailures),
}

impl FerryError {
    pub(crate) fn store(context: impl Into<String>, source: StoreError) -> Self {
        FerryError::Store {
            context: context.into(),
            source,
        }
    }
}

/// Every delete that failed during a cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupFailures {
    pub channel: Option<ObjectKey>,
    pub failures: Vec<(ObjectKey, StoreError)>,
}

impl CleanupFailures {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for CleanupFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.channel {
            Some(channel) => write!(
                f,
                "failed to delete {} deployable(s) for channel {}",
                self.failures.len(),
                channel
            )?,
            None => write!(f, "failed to delete {} deployable(s)", self.failures.len())?,
        }
        for (key, cause) in &self.failures {
            write!(f, "; {}: {}", key, cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for CleanupFailures {}
