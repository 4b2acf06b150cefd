//! Parent/child discovery over a snapshot of Deployables.
//!
//! Projections carry no native pointers to their family. The tree is rebuilt
//! from the `channel-source` and `channel` annotations plus the generate-name
//! convention in [`crate::naming`].

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, error};

use crate::error::FerryError;
use crate::naming::generated_name_prefix;
use crate::resource::{Deployable, ObjectKey, annotations};
use crate::store::DeployableStore;

/// Lookup tables over one snapshot, built once per resolution.
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    by_identity: HashMap<String, &'a Deployable>,
    by_source: HashMap<&'a str, Vec<&'a Deployable>>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snapshot: &'a [Deployable]) -> Self {
        let mut by_identity = HashMap::with_capacity(snapshot.len());
        let mut by_source: HashMap<&'a str, Vec<&'a Deployable>> = HashMap::new();

        for deployable in snapshot {
            by_identity.insert(deployable.key().to_string(), deployable);
            if let Some(source) = deployable.annotation(annotations::CHANNEL_SOURCE) {
                by_source.entry(source).or_default().push(deployable);
            }
        }

        Self {
            by_identity,
            by_source,
        }
    }

    /// Object whose `namespace/name` equals `identity`.
    pub fn get(&self, identity: &str) -> Option<&'a Deployable> {
        self.by_identity.get(identity).copied()
    }

    /// Objects whose `channel-source` annotation equals `identity`, in
    /// snapshot order.
    pub fn sourced_from(&self, identity: &str) -> &[&'a Deployable] {
        self.by_source
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The last object in `channel` whose `channel-source` is `root`,
    /// whatever generation it was projected from.
    pub fn projection_of(&self, root: &str, channel: &ObjectKey) -> Option<&'a Deployable> {
        let channel_ref = channel.to_string();
        self.sourced_from(root)
            .iter()
            .rev()
            .find(|candidate| {
                candidate.namespace() == channel.namespace
                    && candidate.annotation(annotations::CHANNEL) == Some(channel_ref.as_str())
            })
            .copied()
    }
}

/// The immediate family of one Deployable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Family {
    /// Object this Deployable was projected from, if it is a projection
    pub parent: Option<Deployable>,

    /// Existing projections of this Deployable, keyed by their `channel`
    /// annotation
    pub children: BTreeMap<String, Deployable>,
}

impl Family {
    /// Resolve a family from an already-fetched snapshot.
    pub fn from_snapshot(
        snapshot: &[Deployable],
        deployable: &Deployable,
        namespaces: &HashSet<String>,
    ) -> Self {
        Self::from_index(&SnapshotIndex::build(snapshot), deployable, namespaces)
    }

    pub fn from_index(
        index: &SnapshotIndex<'_>,
        deployable: &Deployable,
        namespaces: &HashSet<String>,
    ) -> Self {
        if namespaces.is_empty() {
            return Self::default();
        }

        let self_key = deployable.key().to_string();
        let prefix = generated_name_prefix(deployable);

        let parent = deployable
            .annotation(annotations::CHANNEL_SOURCE)
            .filter(|key| !key.is_empty())
            .and_then(|key| index.get(key))
            .cloned();

        let mut children = BTreeMap::new();
        for candidate in index.sourced_from(&self_key) {
            if candidate.metadata.generate_name.as_deref() != Some(prefix.as_str()) {
                continue;
            }
            if !namespaces.contains(candidate.namespace()) {
                continue;
            }
            let channel = candidate
                .annotation(annotations::CHANNEL)
                .unwrap_or_default()
                .to_string();
            debug!(
                deployable = %self_key,
                child = %candidate.key(),
                channel = %channel,
                "Found existing projection"
            );
            children.insert(channel, (*candidate).clone());
        }

        Self { parent, children }
    }

    /// Existing projection into `channel`, if any.
    pub fn child_for(&self, channel: &ObjectKey) -> Option<&Deployable> {
        self.children.get(&channel.to_string())
    }
}

/// Find the parent and the existing channel projections of `deployable`.
///
/// `namespaces` holds the namespaces of the Channels under consideration;
/// when it is empty the store is not consulted at all. The snapshot is a
/// point-in-time read, so projections created concurrently may be missed
/// until the next call.
pub fn resolve_family<S: DeployableStore + ?Sized>(
    store: &S,
    deployable: &Deployable,
    namespaces: &HashSet<String>,
) -> Result<Family, FerryError> {
    if namespaces.is_empty() {
        return Ok(Family::default());
    }

    let snapshot = list_snapshot(store, deployable)?;
    let family = Family::from_snapshot(&snapshot, deployable, namespaces);
    debug!(
        deployable = %deployable.key(),
        parent = ?family.parent.as_ref().map(Deployable::key),
        children = family.children.len(),
        "Resolved deployable family"
    );
    Ok(family)
}

/// Read every Deployable in the store on behalf of `deployable`.
pub(crate) fn list_snapshot<S: DeployableStore + ?Sized>(
    store: &S,
    deployable: &Deployable,
) -> Result<Vec<Deployable>, FerryError> {
    store.list(None).map_err(|e| {
        error!(deployable = %deployable.key(), error = %e, "Failed to list deployables");
        FerryError::store(
            format!("failed to list deployables for {}", deployable.key()),
            e,
        )
    })
}
