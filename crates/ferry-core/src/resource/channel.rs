use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ObjectKey, ObjectMeta, default_api_version};

pub const CHANNEL_KIND: &str = "Channel";

fn default_kind() -> String {
    CHANNEL_KIND.to_string()
}

/// A named distribution point for Deployables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ChannelSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Access gate; a Channel without one only checks namespace/membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gates: Option<ChannelGate>,

    /// Namespaces whose Deployables may be promoted without declaring the
    /// Channel, provided the Channel has gates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_namespaces: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelGate {
    /// Every entry must be present with an equal value on the Deployable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Channel {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::new(namespace, name),
            spec: ChannelSpec::default(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Gate annotations, if the Channel is gated by annotations at all.
    pub fn gate_annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.spec.gates.as_ref().and_then(|g| g.annotations.as_ref())
    }

    pub fn accepts_source_namespace(&self, namespace: &str) -> bool {
        self.spec
            .source_namespaces
            .as_ref()
            .is_some_and(|namespaces| namespaces.iter().any(|ns| ns == namespace))
    }

    /// Install an empty gate (no annotation requirements).
    pub fn with_gate(mut self) -> Self {
        self.spec.gates.get_or_insert_with(ChannelGate::default);
        self
    }

    pub fn with_gate_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec
            .gates
            .get_or_insert_with(ChannelGate::default)
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_source_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.spec
            .source_namespaces
            .get_or_insert_with(Vec::new)
            .push(namespace.into());
        self
    }
}
