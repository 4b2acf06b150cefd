use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ObjectKey, ObjectMeta, OwnerReference, default_api_version};

pub const DEPLOYABLE_KIND: &str = "Deployable";

fn default_kind() -> String {
    DEPLOYABLE_KIND.to_string()
}

/// A template that can be instantiated and distributed through Channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployable {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: DeployableSpec,
}

/// Desired state of a Deployable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployableSpec {
    /// Opaque payload carried to every projection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<serde_json::Value>,

    /// Channels this Deployable declares membership in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ObjectKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Override>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

/// Scheduling directive: where the template should be instantiated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cluster_selector: BTreeMap<String, String>,
}

/// Per-cluster patch applied on top of the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub cluster_name: String,

    #[serde(default)]
    pub patches: Vec<serde_json::Value>,
}

/// Another resource that must exist before the template is instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Deployable {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::new(namespace, name),
            spec: DeployableSpec::default(),
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

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotation(key)
    }

    /// Whether `channel` appears in `spec.channels`.
    pub fn declares_channel(&self, channel: &ObjectKey) -> bool {
        self.spec.channels.iter().any(|c| c == channel)
    }

    /// Owner reference pointing at this object.
    pub fn owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
        }
    }

    pub fn with_generate_name(mut self, generate_name: impl Into<String>) -> Self {
        self.metadata.generate_name = Some(generate_name.into());
        self
    }

    pub fn with_channel(mut self, channel: ObjectKey) -> Self {
        self.spec.channels.push(channel);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.set_annotation(key, value);
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_template(mut self, template: serde_json::Value) -> Self {
        self.spec.template = Some(template);
        self
    }
}
