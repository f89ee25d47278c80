//! Schema-less metadata path: asset listing and lookup by id.
//!
//! Payload shapes are fixed by contract, so answers are deserialized
//! straight into [`AssetDescriptor`] without building a tree.

use crate::error::FederationError;
use crate::transport::TransportError;
use semfed_manifest::ResolvedManifest;
use serde::{Deserialize, Serialize};

/// Directory record for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl AssetDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            id_short: None,
            global_asset_id: None,
            asset_kind: None,
            asset_type: None,
        }
    }
}

/// What a metadata request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataQuery {
    ListAssets,
    AssetById(String),
}

/// Plain per-plugin request descriptor for the metadata path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRequest {
    pub plugin: String,
    pub url: String,
    pub query: MetadataQuery,
}

impl MetadataRequest {
    pub fn new(plugin: &ResolvedManifest, query: MetadataQuery) -> Self {
        Self {
            plugin: plugin.name.clone(),
            url: plugin.url.clone(),
            query,
        }
    }

    /// Path relative to the plugin URL, with the asset id percent-encoded.
    pub fn path(&self) -> String {
        match &self.query {
            MetadataQuery::ListAssets => "assets".to_string(),
            MetadataQuery::AssetById(id) => format!("assets/{}", urlencoding::encode(id)),
        }
    }
}

/// Collapses the failures of a metadata fan-out into one error.
///
/// A single shared kind is surfaced as is; a mix of kinds becomes
/// `InvalidUpstreamRequest`.
pub(crate) fn combine_failures(failures: &[TransportError]) -> FederationError {
    match failures.split_first() {
        Some((first, rest)) if rest.iter().all(|f| f.kind == first.kind) => {
            FederationError::Upstream(first.kind)
        }
        _ => FederationError::InvalidUpstreamRequest,
    }
}
