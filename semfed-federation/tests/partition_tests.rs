use pretty_assertions::assert_eq;
use semfed_federation::{FederationError, split, validate_coverage};
use semfed_manifest::{ConflictPolicy, CoverageMap, PluginManifest, resolve};
use semfed_tree::{BranchNode, Cardinality, DataType, LeafNode, SemanticTreeNode};

fn coverage(plugins: &[(&str, &[&str])]) -> CoverageMap {
    let manifests: Vec<PluginManifest> = plugins
        .iter()
        .map(|(name, ids)| {
            PluginManifest::new(*name, format!("http://{name}.local")).with_ids(ids.iter().copied())
        })
        .collect();
    resolve(&manifests, ConflictPolicy::TakeFirst).unwrap()
}

fn leaf(id: &str, cardinality: Cardinality) -> LeafNode {
    LeafNode::new(id, cardinality, DataType::String)
}

/// root
/// ├── name (One)
/// ├── serial (ZeroToOne)
/// └── address
///     ├── street (One)
///     └── city (One)
fn nameplate() -> SemanticTreeNode {
    BranchNode::new("root", Cardinality::One)
        .with_child(leaf("name", Cardinality::One))
        .with_child(leaf("serial", Cardinality::ZeroToOne))
        .with_child(
            BranchNode::new("address", Cardinality::ZeroToOne)
                .with_child(leaf("street", Cardinality::One))
                .with_child(leaf("city", Cardinality::One)),
        )
        .into()
}

fn leaf_ids(node: &SemanticTreeNode) -> Vec<String> {
    node.leaves().iter().map(|l| l.id().to_string()).collect()
}

// ── Coverage ─────────────────────────────────────────────────────

#[test]
fn uncovered_required_leaf_fails_coverage() {
    let map = coverage(&[("p1", &["name", "serial", "street"])]);
    let err = validate_coverage(&nameplate(), &map).unwrap_err();
    match err {
        FederationError::IncompleteCoverage { missing } => assert_eq!(missing, vec!["city"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn one_missing_leaf_fails_even_when_the_rest_is_covered() {
    let map = coverage(&[
        ("p1", &["name", "serial"]),
        ("p2", &["street", "address"]),
    ]);
    let err = split(&nameplate(), &map).unwrap_err();
    assert!(matches!(err, FederationError::IncompleteCoverage { .. }));
}

#[test]
fn unknown_cardinality_leaves_are_exempt() {
    let tree: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(leaf("name", Cardinality::One))
        .with_child(leaf("note", Cardinality::Unknown))
        .into();
    let map = coverage(&[("p1", &["name"])]);
    assert!(validate_coverage(&tree, &map).is_ok());
}

#[test]
fn coverage_checks_base_ids() {
    let tree: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(LeafNode::new(
            semfed_tree::SemanticId::parse("name_idx_01"),
            Cardinality::One,
            DataType::String,
        ))
        .into();
    let map = coverage(&[("p1", &["name"])]);
    assert!(validate_coverage(&tree, &map).is_ok());
}

// ── Split ────────────────────────────────────────────────────────

#[test]
fn split_partitions_leaves_by_owner() {
    let map = coverage(&[
        ("p1", &["name", "serial"]),
        ("p2", &["street", "city"]),
    ]);
    let parts = split(&nameplate(), &map).unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(leaf_ids(&parts["p1"]), vec!["name", "serial"]);
    assert_eq!(leaf_ids(&parts["p2"]), vec!["street", "city"]);

    // p2 keeps the path down to its leaves.
    let root = parts["p2"].as_branch().unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(root.children()[0].id().to_string(), "address");
}

#[test]
fn plugin_with_nothing_to_contribute_is_absent() {
    let map = coverage(&[
        ("p1", &["name", "serial", "street", "city"]),
        ("idle", &["unrelated"]),
    ]);
    let parts = split(&nameplate(), &map).unwrap();
    assert!(parts.contains_key("p1"));
    assert!(!parts.contains_key("idle"));
}

#[test]
fn directly_supported_branch_survives_without_children() {
    let tree: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(leaf("name", Cardinality::One))
        .with_child(
            BranchNode::new("address", Cardinality::ZeroToOne)
                .with_child(leaf("street", Cardinality::Unknown)),
        )
        .into();
    let map = coverage(&[("p1", &["name"]), ("p2", &["address"])]);
    let parts = split(&tree, &map).unwrap();

    let root = parts["p2"].as_branch().unwrap();
    let address = root.children()[0].as_branch().unwrap();
    assert_eq!(address.id().to_string(), "address");
    assert!(address.is_empty());
}

#[test]
fn split_preserves_child_order() {
    let tree: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(leaf("c", Cardinality::One))
        .with_child(leaf("a", Cardinality::One))
        .with_child(leaf("b", Cardinality::One))
        .into();
    let map = coverage(&[("p1", &["a", "b", "c"])]);
    let parts = split(&tree, &map).unwrap();
    assert_eq!(leaf_ids(&parts["p1"]), vec!["c", "a", "b"]);
}

#[test]
fn skipped_ids_leave_no_owner() {
    let manifests = vec![
        PluginManifest::new("p1", "http://p1").with_ids(["name", "note"]),
        PluginManifest::new("p2", "http://p2").with_ids(["note"]),
    ];
    let map = resolve(&manifests, ConflictPolicy::SkipConflictingIds).unwrap();
    let tree: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(leaf("name", Cardinality::One))
        .with_child(leaf("note", Cardinality::Unknown))
        .into();

    let parts = split(&tree, &map).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(leaf_ids(&parts["p1"]), vec!["name"]);
}
