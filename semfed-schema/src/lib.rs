//! JSON Schema codec and validator for semantic trees.
//!
//! - [`generate`] renders a template tree as a draft-07 request contract
//! - [`parse`] recovers a tree's shape from an arbitrary JSON answer
//! - [`validate_request_schema`] checks a generated contract against the
//!   draft-07 meta-schema before it is ever sent
//! - [`validate_response_content`] checks an answer against its contract,
//!   after normalizing index-suffixed identifiers back to their base form
//!
//! Compiled response validators live in a process-wide [`SchemaRegistry`]
//! keyed by fresh, request-scoped identifiers.

mod error;
mod generate;
mod parse;
mod registry;
mod validate;

pub use error::{SchemaError, SchemaResult};
pub use generate::{DRAFT_07, definition_ref, escape_pointer, generate};
pub use parse::{decode_document, parse, parse_value};
pub use registry::SchemaRegistry;
pub use validate::{
    normalize_schema, validate_request_schema, validate_response_content,
    validate_response_content_in,
};
