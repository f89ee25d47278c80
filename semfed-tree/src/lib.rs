//! Semantic tree model for semfed.
//!
//! Every other semfed crate consumes and produces these types:
//! - [`SemanticId`]: a base identifier plus an optional occurrence index
//! - [`Cardinality`]: declared multiplicity of a field
//! - [`DataType`]: primitive type of a leaf value
//! - [`SemanticTreeNode`]: branch/leaf sum type forming templates and answers
//!
//! The tree is purely structural. Values are strings (or lists of strings);
//! typing and multiplicity come from the template, never from a response.

mod cardinality;
mod id;
mod node;

pub use cardinality::{Cardinality, DataType};
pub use id::{INDEX_MARKER, SemanticId};
pub use node::{BranchNode, LeafNode, LeafValue, SemanticTreeNode};
