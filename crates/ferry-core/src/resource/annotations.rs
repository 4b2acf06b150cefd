//! Annotation keys read and written on Deployables.

/// Identity (`namespace/name`) of the root Deployable a projection came from.
pub const CHANNEL_SOURCE: &str = "channel-source";

/// Identity (`namespace/name`) of the Channel a projection was placed into.
pub const CHANNEL: &str = "channel";

/// `"true"` on every projection.
pub const IS_GENERATED: &str = "is-generated";

/// `"false"` on every projection.
pub const IS_LOCAL: &str = "is-local";

/// Opaque version token, passed through to projections unchanged.
pub const DEPLOYABLE_VERSION: &str = "deployable-version";
