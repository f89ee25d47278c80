//! JSON instance → semantic tree.
//!
//! Only the shape is recovered here. Every parsed node carries
//! `Cardinality::Unknown` and `DataType::Unknown`; types and multiplicity
//! come from the template at merge time.

use crate::error::{SchemaError, SchemaResult};
use semfed_tree::{
    BranchNode, Cardinality, DataType, LeafNode, LeafValue, SemanticId, SemanticTreeNode,
};
use serde_json::{Map, Value};

/// Decodes JSON text, unwrapping once when the document is a JSON string
/// that itself holds escaped JSON.
pub fn decode_document(json: &str) -> SchemaResult<Value> {
    match serde_json::from_str(json)? {
        Value::String(inner) => Ok(serde_json::from_str(&inner)?),
        value => Ok(value),
    }
}

/// Parses JSON text into a semantic tree.
pub fn parse(json: &str) -> SchemaResult<SemanticTreeNode> {
    parse_value(decode_document(json)?)
}

/// Builds a semantic tree from an already decoded JSON value.
///
/// A single-property object yields the node for that property. An object
/// with several properties yields an anonymous branch holding one node per
/// property, and so does a single property holding several objects: each
/// array element becomes a sibling carrying the property's id.
pub fn parse_value(value: Value) -> SchemaResult<SemanticTreeNode> {
    let Value::Object(map) = value else {
        return Err(SchemaError::UnexpectedShape(format!(
            "expected a JSON object at the top level, found {}",
            kind_of(&value)
        )));
    };

    if map.len() == 1 {
        let mut container = anonymous_branch();
        for (key, value) in map {
            push_property(&mut container, &key, value);
        }
        if container.len() == 1 {
            return Ok(container.into_children().remove(0));
        }
        return Ok(container.into());
    }

    Ok(object_branch(anonymous_id(), map).into())
}

fn anonymous_id() -> SemanticId {
    SemanticId::new("")
}

fn anonymous_branch() -> BranchNode {
    BranchNode::new(anonymous_id(), Cardinality::Unknown)
}

fn object_branch(id: SemanticId, map: Map<String, Value>) -> BranchNode {
    let mut branch = BranchNode::new(id, Cardinality::Unknown);
    for (key, value) in map {
        push_property(&mut branch, &key, value);
    }
    branch
}

/// Appends the node(s) for one JSON property to `parent`.
fn push_property(parent: &mut BranchNode, name: &str, value: Value) {
    let id = SemanticId::parse(name);
    match value {
        Value::Object(map) => parent.push(object_branch(id, map)),
        Value::Array(items) if items.iter().all(is_primitive) => {
            // Repeated values of one identifier, not separate fields.
            let mut branch = BranchNode::new(id.clone(), Cardinality::Unknown);
            for item in items {
                branch.push(leaf(id.clone(), item));
            }
            parent.push(branch);
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => parent.push(object_branch(id.clone(), map)),
                    nested @ Value::Array(_) => push_property(parent, name, nested),
                    primitive => parent.push(leaf(id.clone(), primitive)),
                }
            }
        }
        primitive => parent.push(leaf(id, primitive)),
    }
}

fn leaf(id: SemanticId, value: Value) -> LeafNode {
    LeafNode::new(id, Cardinality::Unknown, DataType::Unknown).with_value(primitive_value(value))
}

fn primitive_value(value: Value) -> LeafValue {
    match value {
        Value::Null => LeafValue::Empty,
        Value::String(s) => LeafValue::Scalar(s),
        Value::Bool(b) => LeafValue::Scalar(b.to_string()),
        Value::Number(n) => LeafValue::Scalar(n.to_string()),
        other => LeafValue::Scalar(other.to_string()),
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
