//! Folds plugin answers back into one tree shaped by the template.
//!
//! The template is authoritative: only its nodes appear in the result, in
//! its order. Candidates for a template node are the same-id nodes found at
//! the same structural position across all answers.

use crate::error::{FederationError, FederationResult};
use semfed_tree::{BranchNode, Cardinality, LeafNode, LeafValue, SemanticId, SemanticTreeNode};
use tracing::debug;

/// Merges parsed plugin answers against `template`.
///
/// A branch root follows the same single/many rule as any other branch:
/// when it is many (declared, or `Unknown` with some answer repeating it),
/// every root instance is kept and several are returned as indexed siblings
/// under an anonymous container.
pub fn merge(
    template: &SemanticTreeNode,
    responses: &[SemanticTreeNode],
) -> FederationResult<SemanticTreeNode> {
    let mut instances: Vec<&SemanticTreeNode> = Vec::new();
    let mut loose: Vec<&SemanticTreeNode> = Vec::new();
    let mut repeated = false;
    for response in responses {
        let before = instances.len();
        for node in unwrap_anonymous(response) {
            if node.id().same_base(template.id()) {
                instances.push(node);
            } else {
                loose.extend(loose_nodes(node, template));
            }
        }
        repeated |= instances.len() - before > 1;
    }

    let merged: SemanticTreeNode = match template {
        SemanticTreeNode::Leaf(leaf) => merge_leaf(leaf, &matching(&instances, leaf.id()))?,
        SemanticTreeNode::Branch(root) => merge_root(root, &instances, &loose, repeated)?,
    };
    debug!(
        responses = responses.len(),
        instances = instances.len(),
        leaves = merged.leaves().len(),
        "merged plugin answers"
    );
    Ok(merged)
}

fn unwrap_anonymous(response: &SemanticTreeNode) -> Vec<&SemanticTreeNode> {
    match response {
        SemanticTreeNode::Branch(branch) if branch.id().is_anonymous() => {
            branch.children().iter().collect()
        }
        other => vec![other],
    }
}

/// Candidates contributed by a node that is not a root instance.
///
/// One of the template's top-level nodes contributes itself; any other
/// wrapper contributes its children.
fn loose_nodes<'a>(
    node: &'a SemanticTreeNode,
    template: &SemanticTreeNode,
) -> Vec<&'a SemanticTreeNode> {
    let SemanticTreeNode::Branch(branch) = node else {
        return vec![node];
    };
    let is_template_child = template
        .as_branch()
        .is_some_and(|root| root.children().iter().any(|c| c.id().same_base(branch.id())));
    if is_template_child {
        vec![node]
    } else {
        branch.children().iter().collect()
    }
}

fn merge_root(
    template: &BranchNode,
    instances: &[&SemanticTreeNode],
    loose: &[&SemanticTreeNode],
    repeated: bool,
) -> FederationResult<SemanticTreeNode> {
    let branches = branch_candidates(template, instances)?;
    let many = match template.cardinality() {
        Cardinality::Unknown => repeated,
        cardinality => cardinality.is_many(),
    };

    if !many || branches.is_empty() {
        let mut pool: Vec<&SemanticTreeNode> = branches
            .iter()
            .copied()
            .flat_map(BranchNode::children)
            .collect();
        pool.extend_from_slice(loose);
        return Ok(merge_children(template, &pool)?.into());
    }

    let extra = if loose.is_empty() {
        None
    } else {
        Some(merge_children(template, loose)?)
    };
    let mut sources: Vec<&BranchNode> = branches;
    sources.extend(extra.as_ref());

    let mut roots = siblings(template, &sources);
    if roots.len() == 1 {
        return Ok(roots.remove(0));
    }
    let mut container = BranchNode::new(SemanticId::new(""), Cardinality::Unknown);
    for root in roots {
        container.push(root);
    }
    Ok(container.into())
}

/// Same-id candidates in pool order. Exact matches (occurrence index
/// included) win over base-id matches.
fn matching<'a>(pool: &[&'a SemanticTreeNode], id: &SemanticId) -> Vec<&'a SemanticTreeNode> {
    let exact: Vec<_> = pool.iter().copied().filter(|c| c.id() == id).collect();
    if !exact.is_empty() {
        return exact;
    }
    pool.iter().copied().filter(|c| c.id().same_base(id)).collect()
}

fn merge_children(template: &BranchNode, pool: &[&SemanticTreeNode]) -> FederationResult<BranchNode> {
    let mut merged = template.empty_like();
    for child in template.children() {
        let candidates = matching(pool, child.id());
        match child {
            SemanticTreeNode::Leaf(leaf) => merged.push(merge_leaf(leaf, &candidates)?),
            SemanticTreeNode::Branch(branch) => {
                for node in merge_branch(branch, &candidates)? {
                    merged.push(node);
                }
            }
        }
    }
    Ok(merged)
}

/// Folds leaf candidates into one leaf.
///
/// Each candidate contributes one value; a parsed array of primitives counts
/// as a single array value. When all candidates are kept their values are
/// concatenated, and `null` answers (`LeafValue::Empty`) contribute nothing,
/// so positions in the result do not line up with sibling instances.
fn merge_leaf(template: &LeafNode, candidates: &[&SemanticTreeNode]) -> FederationResult<SemanticTreeNode> {
    let mut values: Vec<LeafValue> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match candidate {
            SemanticTreeNode::Leaf(leaf) => values.push(leaf.value().clone()),
            SemanticTreeNode::Branch(branch) => values.push(array_value(template, branch)?),
        }
    }

    if values.is_empty() {
        return Ok(template.clone().into());
    }

    let value = if template.cardinality().keeps_all(values.len()) {
        LeafValue::Array(values.into_iter().flat_map(LeafValue::into_values).collect())
    } else {
        values.swap_remove(0)
    };
    Ok(
        LeafNode::new(template.id().clone(), template.cardinality(), template.data_type())
            .with_value(value)
            .into(),
    )
}

/// The value of a parsed array of primitives: one leaf per element.
fn array_value(template: &LeafNode, branch: &BranchNode) -> FederationResult<LeafValue> {
    let mut elements = Vec::with_capacity(branch.len());
    for element in branch.children() {
        match element {
            SemanticTreeNode::Leaf(leaf) if leaf.id().same_base(template.id()) => {
                elements.extend(leaf.value().clone().into_values())
            }
            _ => {
                return Err(FederationError::MergeInvariant(format!(
                    "leaf '{}' matched a structured branch",
                    template.id()
                )));
            }
        }
    }
    Ok(LeafValue::Array(elements))
}

fn merge_branch(
    template: &BranchNode,
    candidates: &[&SemanticTreeNode],
) -> FederationResult<Vec<SemanticTreeNode>> {
    let branches = branch_candidates(template, candidates)?;
    if branches.is_empty() {
        return Ok(vec![template.empty_like().into()]);
    }

    if template.cardinality().keeps_all(branches.len()) {
        return Ok(siblings(template, &branches));
    }

    let pool: Vec<&SemanticTreeNode> = branches
        .iter()
        .copied()
        .flat_map(BranchNode::children)
        .collect();
    Ok(vec![merge_children(template, &pool)?.into()])
}

fn branch_candidates<'a>(
    template: &BranchNode,
    candidates: &[&'a SemanticTreeNode],
) -> FederationResult<Vec<&'a BranchNode>> {
    let mut branches = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match candidate {
            SemanticTreeNode::Branch(branch) => branches.push(branch),
            SemanticTreeNode::Leaf(leaf) => {
                return Err(FederationError::MergeInvariant(format!(
                    "branch '{}' matched leaf '{}'",
                    template.id(),
                    leaf.id()
                )));
            }
        }
    }
    Ok(branches)
}

/// Every candidate kept verbatim under the template's id, indexed by
/// occurrence when there is more than one.
fn siblings(template: &BranchNode, branches: &[&BranchNode]) -> Vec<SemanticTreeNode> {
    let indexed = branches.len() > 1;
    branches
        .iter()
        .enumerate()
        .map(|(occurrence, branch)| {
            let id = if indexed {
                template.id().with_index(occurrence as u32)
            } else {
                template.id().clone()
            };
            let mut sibling = BranchNode::new(id, template.cardinality());
            for child in branch.children() {
                sibling.push(child.clone());
            }
            SemanticTreeNode::from(sibling)
        })
        .collect()
}
