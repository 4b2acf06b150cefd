//! Ferry Core Library
//!
//! Gate policy, relationship resolution and projection of Deployables
//! into Channels. Storage is abstracted behind [`store::DeployableStore`].

pub mod config;
pub mod error;
pub mod family;
pub mod naming;
pub mod policy;
pub mod projection;
pub mod reconcile;
pub mod resource;
pub mod store;

/// Re-exports of commonly used types
pub mod prelude {
    // Resources
    pub use crate::resource::{
        Channel, ChannelGate, ChannelSpec, Deployable, DeployableSpec, ObjectKey, ObjectMeta,
        OwnerReference,
    };

    // Policy
    pub use crate::policy::{evaluate_promotion, evaluate_residency, gate_annotations_match};

    // Relationships and projections
    pub use crate::family::{Family, SnapshotIndex, resolve_family};
    pub use crate::naming::generated_name_prefix;
    pub use crate::projection::{CleanupReport, cleanup, project};
    pub use crate::reconcile::{ChannelOutcome, PromotionReport, Reconciler};

    // Storage
    pub use crate::store::{DeployableStore, ManifestStore, MemoryStore};

    // Errors
    pub use crate::error::{CleanupFailures, FerryError, StoreError};

    // Configuration
    pub use crate::config::{ConfigStore, FerryConfig, OutputFormat};
}
