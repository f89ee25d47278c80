//! Semantic tree → JSON Schema (draft-07).
//!
//! The root is rendered inline and wrapped under a synthetic object keyed by
//! the root's own identifier. Every later occurrence of a non-root branch is
//! emitted as a `$ref` into `definitions`, so shared shapes are described once.

use crate::error::{SchemaError, SchemaResult};
use semfed_tree::{BranchNode, Cardinality, DataType, LeafNode, SemanticTreeNode};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};

/// `$schema` declared by every generated contract.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Escapes one JSON-pointer reference token (`~` → `~0`, `/` → `~1`).
pub fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// The `$ref` target for a definition key.
///
/// The escaped pointer token is then percent-encoded wherever it is not a
/// valid URI fragment character, so ids such as IRDIs (`0173-1#02-AAO677#002`)
/// still yield a valid `uri-reference`.
pub fn definition_ref(key: &str) -> String {
    format!("{DEFINITIONS_PREFIX}{}", encode_fragment(&escape_pointer(key)))
}

fn encode_fragment(token: &str) -> String {
    let mut encoded = String::with_capacity(token.len());
    let mut buf = [0u8; 4];
    for ch in token.chars() {
        if is_fragment_char(ch) {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// RFC 3986 `pchar`, plus `/` and `?`.
fn is_fragment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/?".contains(ch)
}

/// Renders `tree` as a draft-07 JSON Schema document.
pub fn generate(tree: &SemanticTreeNode) -> SchemaResult<Value> {
    let mut generator = Generator::default();
    let root_key = tree.id().encoded();
    let root_schema = generator.render_root(tree);
    let definitions = generator.into_definitions()?;

    let mut document = Map::new();
    document.insert("$schema".into(), Value::String(DRAFT_07.into()));
    document.insert("type".into(), Value::String("object".into()));
    let mut properties = Map::new();
    properties.insert(root_key.clone(), root_schema);
    document.insert("properties".into(), Value::Object(properties));
    document.insert("required".into(), json!([root_key]));
    if !definitions.is_empty() {
        document.insert("definitions".into(), Value::Object(definitions));
    }
    Ok(Value::Object(document))
}

#[derive(Default)]
struct Generator {
    shapes: HashMap<String, Value>,
    seen: HashSet<String>,
    referenced: Vec<String>,
}

impl Generator {
    fn render_root(&mut self, node: &SemanticTreeNode) -> Value {
        match node {
            SemanticTreeNode::Leaf(leaf) => leaf_schema(leaf),
            SemanticTreeNode::Branch(branch) => {
                let shape = self.object_shape(branch);
                wrap_many(branch.cardinality(), shape)
            }
        }
    }

    fn render(&mut self, node: &SemanticTreeNode) -> Value {
        match node {
            SemanticTreeNode::Leaf(leaf) => leaf_schema(leaf),
            SemanticTreeNode::Branch(branch) => {
                let key = branch.id().encoded();
                if !self.seen.insert(key.clone()) {
                    let reference = json!({ "$ref": definition_ref(&key) });
                    self.referenced.push(key);
                    return wrap_many(branch.cardinality(), reference);
                }
                let shape = self.object_shape(branch);
                self.shapes.insert(key, shape.clone());
                wrap_many(branch.cardinality(), shape)
            }
        }
    }

    fn object_shape(&mut self, branch: &BranchNode) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for child in branch.children() {
            let key = child.id().encoded();
            if child.cardinality().is_required() && !required.contains(&key) {
                required.push(key.clone());
            }
            let schema = self.render(child);
            properties.insert(key, schema);
        }

        let mut shape = Map::new();
        shape.insert("type".into(), Value::String("object".into()));
        shape.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            shape.insert(
                "required".into(),
                Value::Array(required.into_iter().map(Value::String).collect()),
            );
        }
        Value::Object(shape)
    }

    /// Collects the shapes of every referenced branch.
    ///
    /// Each emitted `$ref` must point at a shape recorded by the branch's
    /// first occurrence.
    fn into_definitions(mut self) -> SchemaResult<Map<String, Value>> {
        let mut definitions = Map::new();
        for key in self.referenced {
            if definitions.contains_key(&key) {
                continue;
            }
            let shape = self.shapes.remove(&key).ok_or_else(|| {
                SchemaError::GenerationInvariant(format!(
                    "reference to unrecorded definition '{key}'"
                ))
            })?;
            definitions.insert(key, shape);
        }
        Ok(definitions)
    }
}

fn wrap_many(cardinality: Cardinality, schema: Value) -> Value {
    if cardinality.is_many() {
        json!({ "type": "array", "items": schema })
    } else {
        schema
    }
}

fn leaf_schema(leaf: &LeafNode) -> Value {
    match leaf.data_type() {
        DataType::String | DataType::Unknown => json!({ "type": "string" }),
        DataType::Integer => json!({ "type": "integer" }),
        DataType::Number => json!({ "type": "number" }),
        DataType::Boolean => json!({ "type": "boolean" }),
        DataType::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
    }
}
