//! Tests for parent/child relationship resolution.

mod support;

use std::collections::HashSet;

use ferry_core::error::{FerryError, StoreError};
use ferry_core::family::{Family, SnapshotIndex, resolve_family};
use ferry_core::projection::project;
use ferry_core::resource::{Deployable, ObjectKey, annotations};
use ferry_core::store::{DeployableStore, MemoryStore};

use support::{FlakyStore, key};

fn namespaces(items: &[&str]) -> HashSet<String> {
    items.iter().map(|ns| ns.to_string()).collect()
}

/// A stored projection of `source` into `channel`.
fn stored_projection(store: &MemoryStore, source: &Deployable, channel: &str) -> Deployable {
    let projection = project(Some(source), &key(channel)).unwrap().unwrap();
    store.create(projection).unwrap()
}

#[test]
fn finds_true_child_and_skips_decoy() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    let child = stored_projection(&store, &root, "ns2/C");

    // same generate-name prefix, different source
    let decoy = Deployable::new("ns2", "R-decoy")
        .with_generate_name("R-")
        .with_annotation(annotations::CHANNEL_SOURCE, "ns9/R")
        .with_annotation(annotations::CHANNEL, "ns2/C");
    store.create(decoy).unwrap();

    let family = resolve_family(&store, &root, &namespaces(&["ns2"])).unwrap();

    assert_eq!(family.children.len(), 1);
    assert_eq!(family.child_for(&key("ns2/C")).map(Deployable::key), Some(child.key()));
    assert!(family.parent.is_none());
}

#[test]
fn children_are_keyed_by_channel() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    let in_c = stored_projection(&store, &root, "ns2/C");
    let in_d = stored_projection(&store, &root, "ns3/D");

    let family = resolve_family(&store, &root, &namespaces(&["ns2", "ns3"])).unwrap();

    assert_eq!(family.children.len(), 2);
    assert_eq!(family.children["ns2/C"].key(), in_c.key());
    assert_eq!(family.children["ns3/D"].key(), in_d.key());
}

#[test]
fn children_outside_namespace_set_are_ignored() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    stored_projection(&store, &root, "ns2/C");
    stored_projection(&store, &root, "ns3/D");

    let family = resolve_family(&store, &root, &namespaces(&["ns3"])).unwrap();

    assert_eq!(family.children.len(), 1);
    assert!(family.child_for(&key("ns3/D")).is_some());
    assert!(family.child_for(&key("ns2/C")).is_none());
}

#[test]
fn child_with_other_prefix_is_ignored() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();

    let foreign = Deployable::new("ns2", "other-abcde")
        .with_generate_name("other-")
        .with_annotation(annotations::CHANNEL_SOURCE, "ns1/R")
        .with_annotation(annotations::CHANNEL, "ns2/C");
    store.create(foreign).unwrap();

    let family = resolve_family(&store, &root, &namespaces(&["ns2"])).unwrap();
    assert!(family.children.is_empty());
}

#[test]
fn projection_resolves_its_parent() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    let child = stored_projection(&store, &root, "ns2/C");

    let family = resolve_family(&store, &child, &namespaces(&["ns2"])).unwrap();

    let parent = family.parent.expect("parent should be resolved");
    assert_eq!(parent, root);
}

#[test]
fn parent_is_an_owned_copy() {
    let root = Deployable::new("ns1", "R");
    let mut child = project(Some(&root), &key("ns2/C")).unwrap().unwrap();
    child.metadata.name = "R-abcde".to_string();

    let mut snapshot = vec![root.clone(), child.clone()];
    let family = Family::from_snapshot(&snapshot, &child, &namespaces(&["ns2"]));
    snapshot[0].metadata.labels.insert("mutated".into(), "yes".into());

    assert_eq!(family.parent, Some(root));
}

#[test]
fn empty_namespace_set_skips_the_store() {
    let store = FlakyStore {
        fail_list: true,
        ..FlakyStore::default()
    };
    let root = Deployable::new("ns1", "R");

    let family = resolve_family(&store, &root, &HashSet::new()).unwrap();
    assert_eq!(family, Family::default());
}

#[test]
fn list_failure_returns_no_partial_result() {
    let root = Deployable::new("ns1", "R");
    let mut store = FlakyStore::new([root.clone()]);
    store.fail_list = true;

    let err = resolve_family(&store, &root, &namespaces(&["ns2"])).unwrap_err();

    match err {
        FerryError::Store { context, source } => {
            assert!(context.contains("ns1/R"));
            assert!(matches!(source, StoreError::Unavailable(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_parent_is_tolerated() {
    let orphan = Deployable::new("ns2", "R-abcde")
        .with_generate_name("R-")
        .with_annotation(annotations::CHANNEL_SOURCE, "ns1/R");
    let snapshot = vec![orphan.clone()];

    let family = Family::from_snapshot(&snapshot, &orphan, &namespaces(&["ns2"]));
    assert!(family.parent.is_none());
    assert!(family.children.is_empty());
}

#[test]
fn snapshot_resolution_matches_store_resolution() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    stored_projection(&store, &root, "ns2/C");

    let snapshot = store.list(None).unwrap();
    let ns = namespaces(&["ns2"]);
    assert_eq!(
        Family::from_snapshot(&snapshot, &root, &ns),
        resolve_family(&store, &root, &ns).unwrap()
    );
    assert_eq!(
        Family::from_snapshot(&snapshot, &root, &ns)
            .child_for(&ObjectKey::new("ns2", "C"))
            .map(Deployable::namespace),
        Some("ns2")
    );
}

#[test]
fn index_finds_any_generation_projected_from_root() {
    let store = MemoryStore::new();
    let root = store.create(Deployable::new("ns1", "R")).unwrap();
    let child = stored_projection(&store, &root, "ns2/C");
    let grandchild = stored_projection(&store, &child, "ns3/D");

    let snapshot = store.list(None).unwrap();
    let index = SnapshotIndex::build(&snapshot);

    assert_eq!(
        index.projection_of("ns1/R", &key("ns3/D")).map(Deployable::key),
        Some(grandchild.key())
    );
    assert_eq!(
        index.projection_of("ns1/R", &key("ns2/C")).map(Deployable::key),
        Some(child.key())
    );
    assert!(index.projection_of("ns1/R", &key("ns4/E")).is_none());
    // the grandchild is not part of the child's own family
    assert!(
        Family::from_snapshot(&snapshot, &child, &namespaces(&["ns3"]))
            .children
            .is_empty()
    );
}
