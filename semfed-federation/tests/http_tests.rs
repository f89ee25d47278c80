use semfed_federation::{
    FederationConfig, FederationEngine, HttpPluginTransport, MetadataQuery, MetadataRequest,
    PluginEndpoint, PluginTransport, UpstreamErrorKind,
};
use semfed_manifest::{Capabilities, ResolvedManifest};
use semfed_tree::{BranchNode, Cardinality, DataType, LeafNode, LeafValue, SemanticTreeNode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> HttpPluginTransport {
    HttpPluginTransport::new(Duration::from_secs(5)).unwrap()
}

fn resolved(url: &str) -> ResolvedManifest {
    ResolvedManifest {
        name: "p1".into(),
        url: url.into(),
        semantic_ids: vec!["id-1".into()],
        capabilities: Capabilities::default(),
    }
}

// ── Routes ──────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"supportedSemanticIds":["id-1"]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = transport()
        .fetch_manifest(&PluginEndpoint::new("p1", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, r#"{"supportedSemanticIds":["id-1"]}"#);
}

#[tokio::test]
async fn posts_schema_to_tree_route() {
    let server = MockServer::start().await;
    let schema = json!({"type": "object", "properties": {"root": {"type": "object"}}});
    Mock::given(method("POST"))
        .and(path("/tree"))
        .and(body_json(&schema))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"root":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let body = transport()
        .request_tree(&resolved(&server.uri()), &schema)
        .await
        .unwrap();
    assert_eq!(body, r#"{"root":{}}"#);
}

#[tokio::test]
async fn trailing_slash_in_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let body = transport()
        .fetch_manifest(&PluginEndpoint::new("p1", url))
        .await
        .unwrap();
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn metadata_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"a1"}]"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"a1"}"#))
        .mount(&server)
        .await;

    let plugin = resolved(&server.uri());
    let http = transport();
    let listed = http
        .request_metadata(&MetadataRequest::new(&plugin, MetadataQuery::ListAssets))
        .await
        .unwrap();
    assert_eq!(listed, r#"[{"id":"a1"}]"#);

    let found = http
        .request_metadata(&MetadataRequest::new(
            &plugin,
            MetadataQuery::AssetById("a1".into()),
        ))
        .await
        .unwrap();
    assert_eq!(found, r#"{"id":"a1"}"#);
}

// ── Error classification ────────────────────────────────────────

#[tokio::test]
async fn status_codes_are_classified() {
    let cases = [
        (404, UpstreamErrorKind::NotFound),
        (401, UpstreamErrorKind::Unauthorized),
        (403, UpstreamErrorKind::Forbidden),
        (503, UpstreamErrorKind::Unavailable),
        (500, UpstreamErrorKind::InvalidResponse),
    ];
    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manifest"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = transport()
            .fetch_manifest(&PluginEndpoint::new("p1", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, kind, "status {status}");
        assert!(err.message.contains("nope"));
    }
}

#[tokio::test]
async fn slow_plugin_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let http = HttpPluginTransport::new(Duration::from_millis(100)).unwrap();
    let err = http
        .fetch_manifest(&PluginEndpoint::new("p1", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, UpstreamErrorKind::Timeout);
}

#[tokio::test]
async fn unreachable_plugin_is_unavailable() {
    let err = transport()
        .fetch_manifest(&PluginEndpoint::new("p1", "http://127.0.0.1:1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, UpstreamErrorKind::Unavailable);
}

// ── End to end ──────────────────────────────────────────────────

async fn plugin(ids: &[&str], answer: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "supportedSemanticIds": ids })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn engine_federates_over_http() {
    let p1 = plugin(&["id-1"], json!({"root": {"id-1": "a"}})).await;
    let p2 = plugin(&["id-1", "id-2"], json!({"root": {"id-2": "b"}})).await;

    let config = FederationConfig {
        plugins: vec![
            PluginEndpoint::new("p1", p1.uri()),
            PluginEndpoint::new("p2", p2.uri()),
        ],
        ..Default::default()
    };
    let transport = HttpPluginTransport::from_config(&config).unwrap();
    let engine = FederationEngine::initialize(&config, Arc::new(transport))
        .await
        .unwrap();

    let template: SemanticTreeNode = BranchNode::new("root", Cardinality::One)
        .with_child(LeafNode::new("id-1", Cardinality::One, DataType::String))
        .with_child(LeafNode::new("id-2", Cardinality::ZeroToMany, DataType::String))
        .into();
    let merged = engine
        .fetch_tree(&template, &CancellationToken::new())
        .await
        .unwrap();

    let values: Vec<&LeafValue> = merged.leaves().into_iter().map(LeafNode::value).collect();
    assert_eq!(
        values,
        vec![&LeafValue::from("a"), &LeafValue::from(vec!["b".to_string()])]
    );
}
