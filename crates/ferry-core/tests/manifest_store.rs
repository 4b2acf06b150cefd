//! Tests for the file-backed manifest store.

use tempfile::TempDir;

use ferry_core::error::StoreError;
use ferry_core::reconcile::Reconciler;
use ferry_core::resource::{Deployable, ObjectKey, annotations};
use ferry_core::store::{DeployableStore, Manifest, ManifestStore};

const MANIFEST: &str = r#"
[[deployables]]
[deployables.metadata]
name = "R"
namespace = "ns1"

[deployables.metadata.labels]
app = "web"

[deployables.metadata.annotations]
tier = "gold"

[deployables.spec]
channels = ["ns2/C"]

[deployables.spec.template]
kind = "ConfigMap"

[deployables.spec.placement]
clusters = ["east"]

[[channels]]
[channels.metadata]
name = "C"
namespace = "ns2"

[channels.spec]
source_namespaces = ["ns1"]

[channels.spec.gates.annotations]
tier = "gold"
"#;

fn setup_store(content: &str) -> (TempDir, ManifestStore) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join("manifest.toml");
    std::fs::write(&path, content).expect("Failed to write manifest");
    (temp, ManifestStore::new(path))
}

#[test]
fn load_missing_returns_empty_manifest() {
    let temp = TempDir::new().unwrap();
    let store = ManifestStore::new(temp.path().join("absent.toml"));

    let manifest = store.load().unwrap();
    assert!(manifest.deployables.is_empty());
    assert!(manifest.channels.is_empty());
    assert!(store.list(None).unwrap().is_empty());
}

#[test]
fn parses_deployables_and_channels() {
    let (_temp, store) = setup_store(MANIFEST);

    let manifest = store.load().unwrap();
    assert_eq!(manifest.deployables.len(), 1);
    let root = &manifest.deployables[0];
    assert_eq!(root.key(), ObjectKey::new("ns1", "R"));
    assert_eq!(root.kind, "Deployable");
    assert_eq!(root.spec.channels, vec![ObjectKey::new("ns2", "C")]);
    assert_eq!(root.annotation("tier"), Some("gold"));
    assert!(root.spec.placement.is_some());

    let channel = store.channel(&ObjectKey::new("ns2", "C")).unwrap().unwrap();
    assert!(channel.accepts_source_namespace("ns1"));
    assert_eq!(
        channel.gate_annotations().and_then(|g| g.get("tier")).map(String::as_str),
        Some("gold")
    );
}

#[test]
fn bare_channel_reference_is_rejected() {
    let content = r#"
[[deployables]]
[deployables.metadata]
name = "R"
namespace = "ns1"

[deployables.spec]
channels = ["C"]
"#;
    let (_temp, store) = setup_store(content);

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Parse(_)));
}

#[test]
fn duplicate_deployable_is_rejected() {
    let content = r#"
[[deployables]]
[deployables.metadata]
name = "R"
namespace = "ns1"

[[deployables]]
[deployables.metadata]
name = "R"
namespace = "ns1"
"#;
    assert!(matches!(
        Manifest::parse(content),
        Err(StoreError::AlreadyExists(_))
    ));
}

#[test]
fn create_and_delete_persist_to_disk() {
    let (_temp, store) = setup_store(MANIFEST);

    let created = store
        .create(Deployable::new("ns2", "").with_generate_name("R-"))
        .unwrap();
    assert!(created.name().starts_with("R-"));

    let reopened = ManifestStore::new(store.path());
    assert!(reopened.get(&created.key()).unwrap().is_some());
    assert_eq!(reopened.list(Some("ns2")).unwrap().len(), 1);

    reopened.delete(&created.key()).unwrap();
    assert!(store.get(&created.key()).unwrap().is_none());
    assert!(matches!(
        store.delete(&created.key()),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn promotion_round_trips_through_the_manifest() {
    let (_temp, store) = setup_store(MANIFEST);
    let root = store.get(&ObjectKey::new("ns1", "R")).unwrap().unwrap();
    let channels = store.channels().unwrap();

    let report = Reconciler::new(&store).promote(&root, &channels).unwrap();
    let created = report.created().next().unwrap().clone();

    let projection = ManifestStore::new(store.path())
        .get(&created)
        .unwrap()
        .unwrap();
    assert_eq!(projection.annotation(annotations::CHANNEL_SOURCE), Some("ns1/R"));
    assert_eq!(projection.metadata.labels.get("app").map(String::as_str), Some("web"));
    assert!(projection.spec.placement.is_none());
    assert!(projection.metadata.uid.is_some());
}

#[test]
fn parse_error_includes_line_context() {
    let (_temp, store) = setup_store("[[deployables]\nname = 1\n");

    match store.load() {
        Err(StoreError::Parse(message)) => assert!(message.contains("line")),
        other => panic!("unexpected result: {other:?}"),
    }
}
