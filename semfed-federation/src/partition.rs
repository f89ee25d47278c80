//! Splits a template into one sub-tree per plugin.

use crate::error::{FederationError, FederationResult};
use semfed_manifest::CoverageMap;
use semfed_tree::{Cardinality, SemanticTreeNode};
use std::collections::BTreeMap;
use tracing::debug;

/// Fails when a leaf with a declared cardinality has no owning plugin.
///
/// Leaves with `Cardinality::Unknown` are exempt. All uncovered ids are
/// reported, each once, in traversal order.
pub fn validate_coverage(tree: &SemanticTreeNode, coverage: &CoverageMap) -> FederationResult<()> {
    let mut missing: Vec<String> = Vec::new();
    for leaf in tree.leaves() {
        if leaf.cardinality() == Cardinality::Unknown {
            continue;
        }
        let base = leaf.id().base();
        if !coverage.is_covered(base) && !missing.iter().any(|m| m == base) {
            missing.push(base.to_string());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FederationError::IncompleteCoverage { missing })
    }
}

/// Partitions `tree` by plugin ownership.
///
/// Plugins with nothing to contribute are absent from the result.
pub fn split(
    tree: &SemanticTreeNode,
    coverage: &CoverageMap,
) -> FederationResult<BTreeMap<String, SemanticTreeNode>> {
    validate_coverage(tree, coverage)?;

    let mut parts = BTreeMap::new();
    for plugin in coverage.plugins() {
        match filter_root(tree, &plugin.name, coverage) {
            Some(part) => {
                debug!(plugin = %plugin.name, leaves = part.leaves().len(), "plugin contributes");
                parts.insert(plugin.name.clone(), part);
            }
            None => debug!(plugin = %plugin.name, "plugin has nothing to contribute"),
        }
    }
    Ok(parts)
}

fn filter_root(
    tree: &SemanticTreeNode,
    plugin: &str,
    coverage: &CoverageMap,
) -> Option<SemanticTreeNode> {
    match filter(tree, plugin, coverage)? {
        SemanticTreeNode::Branch(branch) if branch.is_empty() => None,
        part => Some(part),
    }
}

fn filter(node: &SemanticTreeNode, plugin: &str, coverage: &CoverageMap) -> Option<SemanticTreeNode> {
    match node {
        SemanticTreeNode::Leaf(leaf) => coverage
            .supports(plugin, leaf.id().base())
            .then(|| node.clone()),
        SemanticTreeNode::Branch(branch) => {
            let mut pruned = branch.empty_like();
            for child in branch.children() {
                if let Some(kept) = filter(child, plugin, coverage) {
                    pruned.push(kept);
                }
            }
            if pruned.is_empty() && !coverage.supports(plugin, branch.id().base()) {
                return None;
            }
            Some(pruned.into())
        }
    }
}
