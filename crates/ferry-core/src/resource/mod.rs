//! Resource model: Deployables, Channels and their shared metadata.

pub mod annotations;
mod channel;
mod deployable;
mod key;
mod meta;

pub use channel::{Channel, ChannelGate, ChannelSpec};
pub use deployable::{Deployable, DeployableSpec, Dependency, Override, Placement};
pub use key::ObjectKey;
pub use meta::{ObjectMeta, OwnerReference};

/// API group/version stamped on resources created by ferry.
pub const API_VERSION: &str = "apps.ferry.io/v1";

pub(crate) fn default_api_version() -> String {
    API_VERSION.to_string()
}
