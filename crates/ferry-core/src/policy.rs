//! Gate policy for Deployables entering Channels.
//!
//! Denial is a plain `false`, never an error. Absent inputs are denied.

use std::collections::BTreeMap;

use crate::resource::{Channel, Deployable};

/// Check if a Deployable rightfully resides in a Channel.
pub fn evaluate_residency(deployable: Option<&Deployable>, channel: Option<&Channel>) -> bool {
    let (Some(deployable), Some(channel)) = (deployable, channel) else {
        return false;
    };

    if deployable.namespace() != channel.namespace() {
        return false;
    }

    passes_gate(deployable, channel)
}

/// Check if a Deployable may be promoted into a Channel.
///
/// A Deployable qualifies either by declaring the Channel in `spec.channels`,
/// or by living in one of the Channel's source namespaces. The second path is
/// only open on gated Channels.
pub fn evaluate_promotion(deployable: Option<&Deployable>, channel: Option<&Channel>) -> bool {
    let (Some(deployable), Some(channel)) = (deployable, channel) else {
        return false;
    };

    let declared = deployable.declares_channel(&channel.key());
    if !declared {
        if channel.spec.gates.is_none() {
            return false;
        }
        if !channel.accepts_source_namespace(deployable.namespace()) {
            return false;
        }
    }

    passes_gate(deployable, channel)
}

fn passes_gate(deployable: &Deployable, channel: &Channel) -> bool {
    match channel.gate_annotations() {
        None => true,
        Some(gate) => match deployable.metadata.annotations.as_ref() {
            None => false,
            Some(annotations) => gate_annotations_match(annotations, gate),
        },
    }
}

/// Every gate entry must be present with an equal value. Extra annotations
/// are ignored.
pub fn gate_annotations_match(
    annotations: &BTreeMap<String, String>,
    gate: &BTreeMap<String, String>,
) -> bool {
    gate.iter()
        .all(|(key, value)| annotations.get(key) == Some(value))
}
