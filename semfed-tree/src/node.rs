//! Branch/leaf tree nodes.

use crate::{Cardinality, DataType, SemanticId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A node of a semantic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticTreeNode {
    Branch(BranchNode),
    Leaf(LeafNode),
}

impl SemanticTreeNode {
    pub fn id(&self) -> &SemanticId {
        match self {
            SemanticTreeNode::Branch(branch) => branch.id(),
            SemanticTreeNode::Leaf(leaf) => leaf.id(),
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            SemanticTreeNode::Branch(branch) => branch.cardinality(),
            SemanticTreeNode::Leaf(leaf) => leaf.cardinality(),
        }
    }

    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            SemanticTreeNode::Branch(branch) => Some(branch),
            SemanticTreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            SemanticTreeNode::Leaf(leaf) => Some(leaf),
            SemanticTreeNode::Branch(_) => None,
        }
    }

    /// All leaves below (and including) this node, in depth-first order.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// `(depth, base id)` pairs for every node, root at depth 0.
    pub fn identifier_paths(&self) -> BTreeSet<(usize, String)> {
        let mut out = BTreeSet::new();
        collect_paths(self, 0, &mut out);
        out
    }
}

fn collect_leaves<'a>(node: &'a SemanticTreeNode, out: &mut Vec<&'a LeafNode>) {
    match node {
        SemanticTreeNode::Leaf(leaf) => out.push(leaf),
        SemanticTreeNode::Branch(branch) => {
            for child in branch.children() {
                collect_leaves(child, out);
            }
        }
    }
}

fn collect_paths(node: &SemanticTreeNode, depth: usize, out: &mut BTreeSet<(usize, String)>) {
    out.insert((depth, node.id().base().to_string()));
    if let SemanticTreeNode::Branch(branch) = node {
        for child in branch.children() {
            collect_paths(child, depth + 1, out);
        }
    }
}

impl From<BranchNode> for SemanticTreeNode {
    fn from(branch: BranchNode) -> Self {
        SemanticTreeNode::Branch(branch)
    }
}

impl From<LeafNode> for SemanticTreeNode {
    fn from(leaf: LeafNode) -> Self {
        SemanticTreeNode::Leaf(leaf)
    }
}

/// An ordered group of child nodes.
///
/// The identifier is fixed at construction. Children can only be appended;
/// transforms build new branches instead of editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    id: SemanticId,
    #[serde(default)]
    cardinality: Cardinality,
    #[serde(default)]
    children: Vec<SemanticTreeNode>,
}

impl BranchNode {
    pub fn new(id: impl Into<SemanticId>, cardinality: Cardinality) -> Self {
        Self {
            id: id.into(),
            cardinality,
            children: Vec::new(),
        }
    }

    /// Builder-style append.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<SemanticTreeNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends a child at the end.
    pub fn push(&mut self, child: impl Into<SemanticTreeNode>) {
        self.children.push(child.into());
    }

    pub fn id(&self) -> &SemanticId {
        &self.id
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn children(&self) -> &[SemanticTreeNode] {
        &self.children
    }

    pub fn into_children(self) -> Vec<SemanticTreeNode> {
        self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// An empty branch with the same identity and cardinality.
    pub fn empty_like(&self) -> Self {
        Self::new(self.id.clone(), self.cardinality)
    }
}

/// Value carried by a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    #[default]
    Empty,
    Scalar(String),
    Array(Vec<String>),
}

impl LeafValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, LeafValue::Empty)
    }

    /// Flattens the value into its individual strings.
    pub fn into_values(self) -> Vec<String> {
        match self {
            LeafValue::Empty => Vec::new(),
            LeafValue::Scalar(value) => vec![value],
            LeafValue::Array(values) => values,
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::Scalar(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::Scalar(value)
    }
}

impl From<Vec<String>> for LeafValue {
    fn from(values: Vec<String>) -> Self {
        LeafValue::Array(values)
    }
}

/// A typed scalar or array value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    id: SemanticId,
    #[serde(default)]
    cardinality: Cardinality,
    #[serde(default)]
    data_type: DataType,
    #[serde(default)]
    value: LeafValue,
}

impl LeafNode {
    pub fn new(id: impl Into<SemanticId>, cardinality: Cardinality, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            cardinality,
            data_type,
            value: LeafValue::Empty,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<LeafValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn id(&self) -> &SemanticId {
        &self.id
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn value(&self) -> &LeafValue {
        &self.value
    }
}
