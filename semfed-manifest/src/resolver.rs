//! Conflict resolution over declared semantic ids.
//!
//! Resolution is pure: manifests go in, a [`CoverageMap`] comes out. Nothing
//! is mutated in place, and the map is read-only afterwards.

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{Capabilities, Capability, PluginManifest};
use semfed_tree::SemanticId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// What to do with a semantic id declared more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The first declaring manifest (input order) keeps the id.
    #[default]
    TakeFirst,
    /// Nobody answers the id.
    SkipConflictingIds,
    /// Initialization fails.
    ThrowError,
}

/// A manifest after conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub name: String,
    pub url: String,
    /// Owned base ids, deduplicated, in declaration order.
    pub semantic_ids: Vec<String>,
    pub capabilities: Capabilities,
}

/// Authoritative owner of every base semantic id.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    plugins: Vec<ResolvedManifest>,
    owners: HashMap<String, usize>,
    skipped: BTreeSet<String>,
}

impl CoverageMap {
    /// Resolved manifests in input order.
    pub fn plugins(&self) -> &[ResolvedManifest] {
        &self.plugins
    }

    pub fn plugin(&self, name: &str) -> Option<&ResolvedManifest> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// The plugin answering `id` (suffix ignored), if any.
    pub fn owner(&self, id: &str) -> Option<&ResolvedManifest> {
        self.owners
            .get(SemanticId::base_of(id))
            .map(|&index| &self.plugins[index])
    }

    pub fn is_covered(&self, id: &str) -> bool {
        self.owners.contains_key(SemanticId::base_of(id))
    }

    /// Whether `plugin` owns `id` (suffix ignored).
    pub fn supports(&self, plugin: &str, id: &str) -> bool {
        self.owner(id).is_some_and(|owner| owner.name == plugin)
    }

    pub fn ids_for(&self, plugin: &str) -> Option<&[String]> {
        self.plugin(plugin).map(|p| p.semantic_ids.as_slice())
    }

    /// Ids dropped under `ConflictPolicy::SkipConflictingIds`.
    pub fn skipped(&self) -> &BTreeSet<String> {
        &self.skipped
    }

    /// Plugins advertising `capability`, in input order.
    pub fn with_capability(
        &self,
        capability: Capability,
    ) -> impl Iterator<Item = &ResolvedManifest> + '_ {
        self.plugins
            .iter()
            .filter(move |p| p.capabilities.has(capability))
    }
}

/// Resolves declared ids into a coverage map under `policy`.
///
/// An id counts as conflicting when it is declared more than once, whether
/// by different manifests or repeatedly by the same one.
pub fn resolve(manifests: &[PluginManifest], policy: ConflictPolicy) -> ManifestResult<CoverageMap> {
    let mut names = HashSet::new();
    for manifest in manifests {
        if !names.insert(manifest.name.as_str()) {
            return Err(ManifestError::DuplicatePlugin(manifest.name.clone()));
        }
    }

    // id -> declaring manifest indices, one entry per declaration.
    let mut declarations: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for (index, manifest) in manifests.iter().enumerate() {
        if manifest.supported_semantic_ids.is_empty() {
            warn!(plugin = %manifest.name, "plugin declares no semantic ids");
            continue;
        }
        for raw in &manifest.supported_semantic_ids {
            let id = SemanticId::base_of(raw);
            let declared_by = declarations.entry(id).or_default();
            if declared_by.is_empty() {
                order.push(id);
            }
            declared_by.push(index);
        }
    }

    let mut owners = HashMap::new();
    let mut skipped = BTreeSet::new();
    for id in order {
        let declared_by = &declarations[id];
        if declared_by.len() == 1 {
            owners.insert(id.to_string(), declared_by[0]);
            continue;
        }

        let mut plugins: Vec<String> = Vec::new();
        for &index in declared_by {
            let name = &manifests[index].name;
            if !plugins.contains(name) {
                plugins.push(name.clone());
            }
        }
        match policy {
            ConflictPolicy::TakeFirst => {
                info!(id, winner = %plugins[0], ?plugins, "conflicting semantic id, keeping first");
                owners.insert(id.to_string(), declared_by[0]);
            }
            ConflictPolicy::SkipConflictingIds => {
                warn!(id, ?plugins, "conflicting semantic id, skipping");
                skipped.insert(id.to_string());
            }
            ConflictPolicy::ThrowError => {
                return Err(ManifestError::Conflict {
                    id: id.to_string(),
                    plugins,
                });
            }
        }
    }

    let plugins = manifests
        .iter()
        .enumerate()
        .map(|(index, manifest)| {
            let mut semantic_ids: Vec<String> = Vec::new();
            for raw in &manifest.supported_semantic_ids {
                let id = SemanticId::base_of(raw);
                if owners.get(id) == Some(&index) && !semantic_ids.iter().any(|s| s == id) {
                    semantic_ids.push(id.to_string());
                }
            }
            debug!(plugin = %manifest.name, owned = semantic_ids.len(), "resolved manifest");
            ResolvedManifest {
                name: manifest.name.clone(),
                url: manifest.url.clone(),
                semantic_ids,
                capabilities: manifest.capabilities.clone(),
            }
        })
        .collect();

    Ok(CoverageMap {
        plugins,
        owners,
        skipped,
    })
}
