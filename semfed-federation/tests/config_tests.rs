use pretty_assertions::assert_eq;
use semfed_federation::{FederationConfig, FederationError, PluginEndpoint};
use semfed_manifest::ConflictPolicy;
use std::time::Duration;

#[test]
fn defaults() {
    let config = FederationConfig::default();
    assert!(config.plugins.is_empty());
    assert_eq!(config.conflict_policy, ConflictPolicy::TakeFirst);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
}

#[test]
fn parses_full_document() {
    let config = FederationConfig::from_toml_str(
        r#"
        conflict_policy = "skip_conflicting_ids"
        request_timeout_ms = 5000

        [[plugins]]
        name = "erp"
        url = "http://erp.local:8080"

        [[plugins]]
        name = "mes"
        url = "http://mes.local"
        "#,
    )
    .unwrap();

    assert_eq!(config.conflict_policy, ConflictPolicy::SkipConflictingIds);
    assert_eq!(config.request_timeout(), Duration::from_millis(5000));
    assert_eq!(
        config.plugins,
        vec![
            PluginEndpoint::new("erp", "http://erp.local:8080"),
            PluginEndpoint::new("mes", "http://mes.local"),
        ]
    );
}

#[test]
fn missing_fields_take_defaults() {
    let config = FederationConfig::from_toml_str("").unwrap();
    assert_eq!(config.conflict_policy, ConflictPolicy::TakeFirst);
    assert_eq!(config.request_timeout_ms, 30_000);
}

#[test]
fn rejects_duplicate_plugin_names() {
    let err = FederationConfig::from_toml_str(
        r#"
        [[plugins]]
        name = "erp"
        url = "http://a"

        [[plugins]]
        name = "erp"
        url = "http://b"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, FederationError::Config(msg) if msg.contains("duplicate")));
}

#[test]
fn rejects_blank_url() {
    let config = FederationConfig {
        plugins: vec![PluginEndpoint::new("erp", "  ")],
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(FederationError::Config(_))));
}

#[test]
fn rejects_zero_timeout() {
    let err = FederationConfig::from_toml_str("request_timeout_ms = 0").unwrap_err();
    assert!(matches!(err, FederationError::Config(_)));
}

#[test]
fn rejects_unknown_policy() {
    let err = FederationConfig::from_toml_str(r#"conflict_policy = "coin_flip""#).unwrap_err();
    assert!(matches!(err, FederationError::Config(msg) if msg.contains("parse")));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semfed.toml");
    std::fs::write(
        &path,
        "conflict_policy = \"throw_error\"\n\n[[plugins]]\nname = \"erp\"\nurl = \"http://erp\"\n",
    )
    .unwrap();

    let config = FederationConfig::load_from(&path).unwrap();
    assert_eq!(config.conflict_policy, ConflictPolicy::ThrowError);
    assert_eq!(config.plugins.len(), 1);
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FederationConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FederationError::Config(_)));
}
