//! Construction and cleanup of channel projections.

use tracing::{debug, error, info};

use crate::error::{CleanupFailures, FerryError};
use crate::naming::generated_name_prefix;
use crate::resource::{Deployable, DeployableSpec, ObjectKey, ObjectMeta, annotations};
use crate::store::DeployableStore;

/// Build the projection of `source` into `channel`.
///
/// The result is not stored; its `name` is empty and the store allocates one
/// from `generate_name`. The `channel-source` annotation always names the
/// root Deployable: projecting a projection keeps pointing at the original.
pub fn project(
    source: Option<&Deployable>,
    channel: &ObjectKey,
) -> Result<Option<Deployable>, FerryError> {
    let Some(source) = source else {
        return Ok(None);
    };
    if source.name().is_empty() {
        debug!(namespace = %source.namespace(), "Projecting a deployable that has no name yet");
    }

    let spec = DeployableSpec {
        template: source.spec.template.clone(),
        channels: source.spec.channels.clone(),
        placement: None,
        overrides: Vec::new(),
        dependencies: Vec::new(),
    };

    let mut projected_annotations = source.metadata.annotations.clone().unwrap_or_default();
    let root = source
        .annotation(annotations::CHANNEL_SOURCE)
        .filter(|root| !root.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| source.key().to_string());

    projected_annotations.insert(annotations::IS_LOCAL.to_string(), "false".to_string());
    projected_annotations.insert(annotations::CHANNEL_SOURCE.to_string(), root);
    projected_annotations.insert(annotations::CHANNEL.to_string(), channel.to_string());
    projected_annotations.insert(annotations::IS_GENERATED.to_string(), "true".to_string());

    let metadata = ObjectMeta {
        name: String::new(),
        namespace: channel.namespace.clone(),
        generate_name: Some(generated_name_prefix(source)),
        uid: None,
        creation_timestamp: None,
        labels: source.metadata.labels.clone(),
        annotations: Some(projected_annotations),
        owner_references: vec![source.owner_reference()],
    };

    Ok(Some(Deployable {
        api_version: source.api_version.clone(),
        kind: source.kind.clone(),
        metadata,
        spec,
    }))
}

/// Outcome of a successful cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: Vec<ObjectKey>,
}

/// Delete every Deployable in the channel's namespace that declares the
/// channel.
///
/// All deletes are attempted; every failure is reported, not just the last.
pub fn cleanup<S: DeployableStore + ?Sized>(
    store: &S,
    channel: &ObjectKey,
) -> Result<CleanupReport, FerryError> {
    let deployables = store.list(Some(&channel.namespace)).map_err(|e| {
        error!(channel = %channel, error = %e, "Failed to list deployables for cleanup");
        FerryError::store(
            format!("failed to list deployables while cleaning up channel {}", channel),
            e,
        )
    })?;

    let mut report = CleanupReport::default();
    let mut failures = CleanupFailures {
        channel: Some(channel.clone()),
        failures: Vec::new(),
    };

    for deployable in deployables.iter().filter(|d| d.declares_channel(channel)) {
        let key = deployable.key();
        match store.delete(&key) {
            Ok(()) => {
                info!(channel = %channel, deployable = %key, "Deleted deployable");
                report.deleted.push(key);
            }
            Err(e) => {
                error!(channel = %channel, deployable = %key, error = %e, "Failed to delete deployable");
                failures.failures.push((key, e));
            }
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        Err(FerryError::Cleanup(failures))
    }
}
