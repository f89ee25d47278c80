//! Contract checks on both sides of a plugin call.
//!
//! A tree may carry index-suffixed identifiers to tell repeated siblings
//! apart, but the contract a plugin implements is always expressed in base
//! identifiers. Response validation therefore normalizes the schema first.

use crate::error::{SchemaError, SchemaResult};
use crate::generate::{definition_ref, escape_pointer};
use crate::parse::decode_document;
use crate::registry::SchemaRegistry;
use semfed_tree::SemanticId;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Checks a generated contract against the draft-07 meta-schema.
///
/// The schema is serialized and re-read as a generic JSON value first, so
/// anything that would not survive the trip to the plugin fails here.
pub fn validate_request_schema(schema: &Value) -> SchemaResult<()> {
    let text = serde_json::to_string(schema)
        .map_err(|e| SchemaError::Validation(format!("schema does not serialize: {e}")))?;
    let reparsed: Value = serde_json::from_str(&text)
        .map_err(|e| SchemaError::Validation(format!("schema does not re-parse: {e}")))?;
    jsonschema::draft7::meta::validate(&reparsed)
        .map_err(|e| SchemaError::Validation(format!("schema violates draft-07: {e}")))?;
    Ok(())
}

/// Validates a plugin answer against the contract it was sent, using the
/// process-wide registry. Returns the decoded answer.
pub fn validate_response_content(json: &str, schema: &Value) -> SchemaResult<Value> {
    validate_response_content_in(SchemaRegistry::global(), json, schema)
}

/// Same as [`validate_response_content`] with an explicit registry.
pub fn validate_response_content_in(
    registry: &SchemaRegistry,
    json: &str,
    schema: &Value,
) -> SchemaResult<Value> {
    if json.trim().is_empty() {
        return Err(SchemaError::Validation("response body is empty".into()));
    }
    let instance = decode_document(json)
        .map_err(|e| SchemaError::Validation(format!("response is not JSON: {e}")))?;

    let schema_id = format!("urn:uuid:{}", Uuid::new_v4());
    let mut normalized = normalize_schema(schema);
    if let Value::Object(map) = &mut normalized {
        map.insert("$id".into(), Value::String(schema_id.clone()));
    }

    let _registration = Registration {
        registry,
        id: &schema_id,
    };
    let validator = registry.register(&schema_id, &normalized)?;
    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();

    if errors.is_empty() {
        debug!(schema_id = %schema_id, "response matches contract");
        Ok(instance)
    } else {
        Err(SchemaError::Validation(errors.join("; ")))
    }
}

/// Drops the registry entry once validation is over.
struct Registration<'a> {
    registry: &'a SchemaRegistry,
    id: &'a str,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// Rewrites index-suffixed identifiers in a schema to their base form.
///
/// Touches the keys of `properties` and `definitions`, the entries of
/// `required`, and `$ref` targets under `#/definitions/`.
pub fn normalize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                let normalized = match (key.as_str(), value) {
                    ("properties" | "definitions", Value::Object(members)) => {
                        Value::Object(normalize_members(members))
                    }
                    ("required", Value::Array(names)) => Value::Array(normalize_required(names)),
                    ("$ref", Value::String(reference)) => {
                        Value::String(normalize_reference(reference))
                    }
                    _ => normalize_schema(value),
                };
                out.insert(key.clone(), normalized);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_schema).collect()),
        other => other.clone(),
    }
}

fn normalize_members(members: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, schema) in members {
        let base = SemanticId::base_of(name);
        if !out.contains_key(base) {
            out.insert(base.to_string(), normalize_schema(schema));
        }
    }
    out
}

fn normalize_required(names: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(names.len());
    for name in names {
        let normalized = match name {
            Value::String(s) => Value::String(SemanticId::base_of(s).to_string()),
            other => other.clone(),
        };
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn normalize_reference(reference: &str) -> String {
    match reference.strip_prefix(DEFINITIONS_PREFIX) {
        Some(fragment) => {
            let escaped = urlencoding::decode(fragment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| fragment.to_string());
            let target = unescape_pointer(&escaped);
            definition_ref(SemanticId::base_of(&target))
        }
        None => reference.to_string(),
    }
}

fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
