//! Promotion driver: authorize, look up existing projections, create the
//! missing ones.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::error::FerryError;
use crate::family::{Family, SnapshotIndex, list_snapshot};
use crate::policy::{evaluate_promotion, evaluate_residency};
use crate::projection::project;
use crate::resource::{Channel, Deployable, ObjectKey, annotations};
use crate::store::DeployableStore;

/// What happened for one candidate Channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// A new projection was stored under this identity
    Created(ObjectKey),
    /// A projection already existed
    AlreadyPresent(ObjectKey),
    /// The Deployable already lives in the Channel
    Resident,
    /// The Channel's policy refused the Deployable
    Denied,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionReport {
    pub outcomes: Vec<(ObjectKey, ChannelOutcome)>,
}

impl PromotionReport {
    pub fn created(&self) -> impl Iterator<Item = &ObjectKey> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            ChannelOutcome::Created(key) => Some(key),
            _ => None,
        })
    }

    pub fn outcome_for(&self, channel: &ObjectKey) -> Option<&ChannelOutcome> {
        self.outcomes
            .iter()
            .find(|(key, _)| key == channel)
            .map(|(_, outcome)| outcome)
    }
}

#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: DeployableStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Promote `deployable` into every Channel in `channels` that accepts it.
    ///
    /// Safe to re-run: Channels that already hold a projection are left
    /// alone. Creation stops at the first store failure.
    pub fn promote(
        &self,
        deployable: &Deployable,
        channels: &[Channel],
    ) -> Result<PromotionReport, FerryError> {
        let mut report = PromotionReport::default();
        let mut eligible = Vec::new();

        for channel in channels {
            if is_resident(deployable, channel) {
                report.outcomes.push((channel.key(), ChannelOutcome::Resident));
            } else if evaluate_promotion(Some(deployable), Some(channel)) {
                eligible.push(channel);
            } else {
                debug!(deployable = %deployable.key(), channel = %channel.key(), "Promotion denied");
                report.outcomes.push((channel.key(), ChannelOutcome::Denied));
            }
        }

        let namespaces: HashSet<String> = eligible
            .iter()
            .map(|channel| channel.namespace().to_string())
            .collect();
        let snapshot = if namespaces.is_empty() {
            Vec::new()
        } else {
            list_snapshot(&self.store, deployable)?
        };
        let index = SnapshotIndex::build(&snapshot);
        let family = Family::from_index(&index, deployable, &namespaces);
        let root = root_of(deployable);

        for channel in eligible {
            let channel_key = channel.key();
            // Projections of projections are keyed by the root, not by
            // `deployable`, so the family alone misses them.
            let existing = family
                .child_for(&channel_key)
                .or_else(|| index.projection_of(&root, &channel_key));
            if let Some(existing) = existing {
                report
                    .outcomes
                    .push((channel_key, ChannelOutcome::AlreadyPresent(existing.key())));
                continue;
            }

            let Some(projection) = project(Some(deployable), &channel_key)? else {
                continue;
            };
            let created = self.store.create(projection).map_err(|e| {
                error!(
                    deployable = %deployable.key(),
                    channel = %channel_key,
                    error = %e,
                    "Failed to create projection"
                );
                FerryError::store(
                    format!(
                        "failed to create projection of {} into {}",
                        deployable.key(),
                        channel_key
                    ),
                    e,
                )
            })?;
            info!(
                deployable = %deployable.key(),
                channel = %channel_key,
                projection = %created.key(),
                "Created projection"
            );
            report
                .outcomes
                .push((channel_key, ChannelOutcome::Created(created.key())));
        }

        Ok(report)
    }
}

/// Identity every projection of `deployable` records as its `channel-source`.
fn root_of(deployable: &Deployable) -> String {
    deployable
        .annotation(annotations::CHANNEL_SOURCE)
        .filter(|root| !root.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| deployable.key().to_string())
}

fn is_resident(deployable: &Deployable, channel: &Channel) -> bool {
    let placed_here = deployable.annotation(annotations::CHANNEL)
        == Some(channel.key().to_string().as_str());
    placed_here || evaluate_residency(Some(deployable), Some(channel))
}
