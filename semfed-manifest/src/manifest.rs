//! Plugin manifest as discovered from a plugin's manifest endpoint.

use serde::{Deserialize, Serialize};

/// Coarse federation use-cases a plugin answers outside the semantic-tree path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Can answer bulk asset listing.
    #[serde(default)]
    pub has_asset_listing: bool,
    /// Can answer asset lookup by id.
    #[serde(default)]
    pub has_asset_lookup: bool,
}

/// One capability flag, used to filter plugins for the metadata paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    AssetListing,
    AssetLookup,
}

impl Capabilities {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::AssetListing => self.has_asset_listing,
            Capability::AssetLookup => self.has_asset_lookup,
        }
    }
}

/// Body served by a plugin's manifest endpoint.
///
/// Name and URL are not part of the body; they come from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBody {
    #[serde(default)]
    pub supported_semantic_ids: Vec<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// A plugin's declared coverage, before conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name (configuration key).
    pub name: String,
    /// Base URL of the plugin.
    pub url: String,
    /// Base semantic ids as declared. Duplicates are kept so conflict
    /// resolution can see them.
    pub supported_semantic_ids: Vec<String>,
    pub capabilities: Capabilities,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            supported_semantic_ids: Vec::new(),
            capabilities: Capabilities::default(),
        }
    }

    /// Combines configured identity with a fetched manifest body.
    pub fn from_body(name: impl Into<String>, url: impl Into<String>, body: ManifestBody) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            supported_semantic_ids: body.supported_semantic_ids,
            capabilities: body.capabilities,
        }
    }

    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_semantic_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}
