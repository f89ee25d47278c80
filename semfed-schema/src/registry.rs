//! Process-wide registry of compiled response validators.
//!
//! Entries are keyed by freshly generated, request-scoped schema ids, so
//! concurrent requests never collide.

use crate::error::{SchemaError, SchemaResult};
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Compiled validators keyed by schema id.
#[derive(Default)]
pub struct SchemaRegistry {
    validators: RwLock<HashMap<String, Arc<Validator>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry used by [`crate::validate_response_content`].
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(SchemaRegistry::new)
    }

    /// Compiles `schema` as draft-07 and stores it under `id`.
    ///
    /// An existing entry under the same id is replaced.
    pub fn register(&self, id: &str, schema: &Value) -> SchemaResult<Arc<Validator>> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|e| SchemaError::Validation(format!("schema {id} does not compile: {e}")))?;
        let validator = Arc::new(validator);
        self.validators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::clone(&validator));
        debug!(schema_id = id, "registered response schema");
        Ok(validator)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Validator>> {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Validator>> {
        self.validators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
