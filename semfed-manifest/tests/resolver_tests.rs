use pretty_assertions::assert_eq;
use semfed_manifest::{
    Capabilities, Capability, ConflictPolicy, ManifestError, PluginManifest, resolve,
};

fn manifest(name: &str, ids: &[&str]) -> PluginManifest {
    PluginManifest::new(name, format!("http://{name}.local")).with_ids(ids.iter().copied())
}

fn owned(map: &semfed_manifest::CoverageMap, plugin: &str) -> Vec<String> {
    map.ids_for(plugin).unwrap().to_vec()
}

// ── Policies ─────────────────────────────────────────────────────

#[test]
fn take_first_keeps_id_on_first_manifest() {
    let manifests = vec![manifest("p1", &["id-1"]), manifest("p2", &["id-1", "id-2"])];
    let map = resolve(&manifests, ConflictPolicy::TakeFirst).unwrap();

    assert_eq!(owned(&map, "p1"), vec!["id-1"]);
    assert_eq!(owned(&map, "p2"), vec!["id-2"]);
    assert_eq!(map.owner("id-1").unwrap().name, "p1");
    assert!(map.skipped().is_empty());
}

#[test]
fn take_first_follows_input_order_not_names() {
    let manifests = vec![manifest("zeta", &["x"]), manifest("alpha", &["x"])];
    let map = resolve(&manifests, ConflictPolicy::TakeFirst).unwrap();
    assert!(map.supports("zeta", "x"));
    assert!(!map.supports("alpha", "x"));
}

#[test]
fn skip_removes_id_everywhere() {
    let manifests = vec![manifest("p1", &["id-1"]), manifest("p2", &["id-1", "id-2"])];
    let map = resolve(&manifests, ConflictPolicy::SkipConflictingIds).unwrap();

    assert!(owned(&map, "p1").is_empty());
    assert_eq!(owned(&map, "p2"), vec!["id-2"]);
    assert!(!map.is_covered("id-1"));
    assert!(map.skipped().contains("id-1"));
}

#[test]
fn throw_error_fails_on_conflict() {
    let manifests = vec![manifest("p1", &["id-1"]), manifest("p2", &["id-1"])];
    let err = resolve(&manifests, ConflictPolicy::ThrowError).unwrap_err();
    match err {
        ManifestError::Conflict { id, plugins } => {
            assert_eq!(id, "id-1");
            assert_eq!(plugins, vec!["p1", "p2"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn throw_error_passes_without_conflicts() {
    let manifests = vec![manifest("p1", &["a"]), manifest("p2", &["b"])];
    let map = resolve(&manifests, ConflictPolicy::ThrowError).unwrap();
    assert!(map.supports("p1", "a"));
    assert!(map.supports("p2", "b"));
}

// ── Repeats within one manifest ──────────────────────────────────

#[test]
fn repeat_within_one_manifest_is_a_conflict() {
    let manifests = vec![manifest("p1", &["a", "a"])];

    let err = resolve(&manifests, ConflictPolicy::ThrowError).unwrap_err();
    assert!(matches!(err, ManifestError::Conflict { ref id, .. } if id == "a"));

    let map = resolve(&manifests, ConflictPolicy::SkipConflictingIds).unwrap();
    assert!(!map.is_covered("a"));

    let map = resolve(&manifests, ConflictPolicy::TakeFirst).unwrap();
    assert_eq!(owned(&map, "p1"), vec!["a"]);
}

// ── Identifiers ──────────────────────────────────────────────────

#[test]
fn suffixes_are_ignored_for_ownership() {
    let manifests = vec![manifest("p1", &["urn:a"])];
    let map = resolve(&manifests, ConflictPolicy::TakeFirst).unwrap();
    assert!(map.supports("p1", "urn:a_idx_03"));
    assert!(map.is_covered("urn:a_idx_00"));
}

#[test]
fn empty_manifest_passes_through() {
    let manifests = vec![manifest("empty", &[]), manifest("p1", &["a"])];
    let map = resolve(&manifests, ConflictPolicy::ThrowError).unwrap();
    assert_eq!(map.plugins().len(), 2);
    assert!(owned(&map, "empty").is_empty());
}

#[test]
fn duplicate_plugin_names_are_rejected() {
    let manifests = vec![manifest("p1", &["a"]), manifest("p1", &["b"])];
    assert!(matches!(
        resolve(&manifests, ConflictPolicy::TakeFirst),
        Err(ManifestError::DuplicatePlugin(name)) if name == "p1"
    ));
}

#[test]
fn capability_filter_keeps_order() {
    let lister = Capabilities {
        has_asset_listing: true,
        ..Default::default()
    };
    let manifests = vec![
        manifest("a", &[]).with_capabilities(lister.clone()),
        manifest("b", &[]),
        manifest("c", &[]).with_capabilities(lister),
    ];
    let map = resolve(&manifests, ConflictPolicy::TakeFirst).unwrap();
    let names: Vec<_> = map
        .with_capability(Capability::AssetListing)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(map.with_capability(Capability::AssetLookup).count(), 0);
}

#[test]
fn policy_serde_names() {
    let policy: ConflictPolicy = serde_json::from_str("\"skip_conflicting_ids\"").unwrap();
    assert_eq!(policy, ConflictPolicy::SkipConflictingIds);
    assert_eq!(ConflictPolicy::default(), ConflictPolicy::TakeFirst);
}
