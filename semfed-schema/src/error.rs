//! Error types for the schema codec and validator.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while generating, parsing or validating schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The generator produced a shape it cannot express. Always a bug.
    #[error("schema generation invariant violated: {0}")]
    GenerationInvariant(String),

    /// A contract failed the meta-schema, or an answer failed its contract.
    #[error("schema validation failed: {0}")]
    Validation(String),

    /// Malformed JSON text.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed JSON that cannot be read as a semantic tree.
    #[error("unexpected JSON shape: {0}")]
    UnexpectedShape(String),
}

impl SchemaError {
    /// True for errors that signal a defect in the engine itself rather than
    /// a data or contract problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, SchemaError::GenerationInvariant(_))
    }
}
