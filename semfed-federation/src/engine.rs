//! Federation engine: one request/response cycle across every plugin.
//!
//! The engine holds no per-request state. The coverage map is resolved once
//! and frozen; each call to [`FederationEngine::fetch_tree`] builds its own
//! sub-trees, contracts and answers.

use crate::config::{FederationConfig, PluginEndpoint};
use crate::error::{FederationError, FederationResult};
use crate::merge::merge;
use crate::metadata::{AssetDescriptor, MetadataQuery, MetadataRequest, combine_failures};
use crate::partition::split;
use crate::transport::{PluginTransport, TransportError, TransportResult, UpstreamErrorKind};
use futures::future::{join_all, try_join_all};
use semfed_manifest::{
    Capability, ConflictPolicy, CoverageMap, ManifestBody, PluginManifest, ResolvedManifest,
    resolve,
};
use semfed_schema::{
    decode_document, generate, parse_value, validate_request_schema, validate_response_content,
};
use semfed_tree::SemanticTreeNode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Coordinates split, contract generation, dispatch and merge.
#[derive(Clone)]
pub struct FederationEngine {
    /// Frozen after initialization.
    coverage: Arc<CoverageMap>,
    transport: Arc<dyn PluginTransport>,
}

impl FederationEngine {
    /// Fetches every configured manifest concurrently, then resolves
    /// conflicts under the configured policy.
    ///
    /// Any manifest that cannot be fetched or read fails startup.
    pub async fn initialize(
        config: &FederationConfig,
        transport: Arc<dyn PluginTransport>,
    ) -> FederationResult<Self> {
        config.validate()?;

        let fetches = config
            .plugins
            .iter()
            .map(|endpoint| fetch_manifest(transport.as_ref(), endpoint));
        let manifests = try_join_all(fetches).await?;

        Self::from_manifests(&manifests, config.conflict_policy, transport)
    }

    /// Builds an engine from manifests the caller already holds.
    pub fn from_manifests(
        manifests: &[PluginManifest],
        policy: ConflictPolicy,
        transport: Arc<dyn PluginTransport>,
    ) -> FederationResult<Self> {
        let coverage = resolve(manifests, policy)?;
        info!(
            plugins = coverage.plugins().len(),
            skipped = coverage.skipped().len(),
            ?policy,
            "federation engine ready"
        );
        Ok(Self {
            coverage: Arc::new(coverage),
            transport,
        })
    }

    pub fn coverage(&self) -> &CoverageMap {
        &self.coverage
    }

    /// Fills `template` from every plugin that covers part of it.
    ///
    /// Any plugin failure, transport or contract, aborts the whole request.
    pub async fn fetch_tree(
        &self,
        template: &SemanticTreeNode,
        cancel: &CancellationToken,
    ) -> FederationResult<SemanticTreeNode> {
        if cancel.is_cancelled() {
            return Err(FederationError::Cancelled);
        }

        let parts = split(template, &self.coverage)?;
        let mut contracts: Vec<(&ResolvedManifest, Value)> = Vec::with_capacity(parts.len());
        for (name, part) in &parts {
            let plugin = self
                .coverage
                .plugin(name)
                .ok_or_else(|| FederationError::NotFound(format!("plugin '{name}'")))?;
            let schema = generate(part)?;
            validate_request_schema(&schema)?;
            contracts.push((plugin, schema));
        }
        debug!(plugins = contracts.len(), "dispatching tree requests");

        let calls = contracts
            .iter()
            .map(|(plugin, schema)| self.dispatch_tree(plugin, schema));
        let answers = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("tree request cancelled");
                return Err(FederationError::Cancelled);
            }
            answers = try_join_all(calls) => answers?,
        };

        merge(template, &answers)
    }

    async fn dispatch_tree(
        &self,
        plugin: &ResolvedManifest,
        schema: &Value,
    ) -> FederationResult<SemanticTreeNode> {
        let body = self
            .transport
            .request_tree(plugin, schema)
            .await
            .map_err(|source| {
                warn!(plugin = %plugin.name, error = %source, "tree request failed");
                FederationError::Plugin {
                    plugin: plugin.name.clone(),
                    source,
                }
            })?;

        let document = validate_response_content(&body, schema).inspect_err(|e| {
            warn!(plugin = %plugin.name, error = %e, "answer violates its contract");
        })?;
        let tree = parse_value(document)?;
        debug!(plugin = %plugin.name, leaves = tree.leaves().len(), "plugin answered");
        Ok(tree)
    }

    /// Lists assets from every plugin advertising asset listing.
    ///
    /// Partial answers are returned as long as one plugin succeeds.
    pub async fn list_assets(
        &self,
        cancel: &CancellationToken,
    ) -> FederationResult<Vec<AssetDescriptor>> {
        let plugins: Vec<&ResolvedManifest> = self
            .coverage
            .with_capability(Capability::AssetListing)
            .collect();
        if plugins.is_empty() {
            debug!("no plugin lists assets");
            return Ok(Vec::new());
        }

        let calls = plugins.iter().map(|plugin| {
            self.dispatch_metadata::<Vec<AssetDescriptor>>(plugin, MetadataQuery::ListAssets)
        });
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FederationError::Cancelled),
            results = join_all(calls) => results,
        };

        let mut assets = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(mut listed) => assets.append(&mut listed),
                Err(e) => failures.push(e),
            }
        }
        if failures.len() == plugins.len() {
            return Err(combine_failures(&failures));
        }
        Ok(assets)
    }

    /// Looks one asset up; the first plugin in manifest order that finds it
    /// wins.
    pub async fn asset_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> FederationResult<AssetDescriptor> {
        let plugins: Vec<&ResolvedManifest> = self
            .coverage
            .with_capability(Capability::AssetLookup)
            .collect();
        if plugins.is_empty() {
            return Err(FederationError::NotFound(format!("asset '{id}'")));
        }

        let calls = plugins.iter().map(|plugin| {
            self.dispatch_metadata::<AssetDescriptor>(
                plugin,
                MetadataQuery::AssetById(id.to_string()),
            )
        });
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FederationError::Cancelled),
            results = join_all(calls) => results,
        };

        let mut failures = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(asset) => return Ok(asset),
                Err(e) => failures.push(e),
            }
        }
        Err(combine_failures(&failures))
    }

    async fn dispatch_metadata<T: DeserializeOwned>(
        &self,
        plugin: &ResolvedManifest,
        query: MetadataQuery,
    ) -> TransportResult<T> {
        let request = MetadataRequest::new(plugin, query);
        let result = self
            .transport
            .request_metadata(&request)
            .await
            .and_then(|body| read_record(&body));
        if let Err(e) = &result {
            warn!(plugin = %plugin.name, path = %request.path(), error = %e, "metadata request failed");
        }
        result
    }
}

async fn fetch_manifest(
    transport: &dyn PluginTransport,
    endpoint: &PluginEndpoint,
) -> FederationResult<PluginManifest> {
    let body = transport.fetch_manifest(endpoint).await.map_err(|e| {
        FederationError::ManifestInit(format!("{}: {e}", endpoint.name))
    })?;
    let manifest: ManifestBody = serde_json::from_str(&body).map_err(|e| {
        FederationError::ManifestInit(format!("{}: unreadable manifest: {e}", endpoint.name))
    })?;
    debug!(
        plugin = %endpoint.name,
        ids = manifest.supported_semantic_ids.len(),
        "fetched manifest"
    );
    Ok(PluginManifest::from_body(&endpoint.name, &endpoint.url, manifest))
}

/// Reads a fixed-shape record, tolerating a string-wrapped document.
fn read_record<T: DeserializeOwned>(body: &str) -> TransportResult<T> {
    let document = decode_document(body)
        .map_err(|e| TransportError::new(UpstreamErrorKind::InvalidResponse, e.to_string()))?;
    serde_json::from_value(document)
        .map_err(|e| TransportError::new(UpstreamErrorKind::InvalidResponse, e.to_string()))
}
