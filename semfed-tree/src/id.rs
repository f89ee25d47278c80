//! Semantic identifiers.
//!
//! Repeated siblings sharing one base identifier are told apart by an
//! occurrence index. The index only becomes part of the string form at the
//! JSON boundary, as `<base>_idx_<NN>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker placed between the base identifier and the occurrence index.
pub const INDEX_MARKER: &str = "idx";

/// Identifier of one field/position in the federated ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SemanticId {
    base: String,
    index: Option<u32>,
}

impl SemanticId {
    /// Creates an identifier without an occurrence index.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            index: None,
        }
    }

    /// Creates an identifier for the `index`-th occurrence of `base`.
    pub fn indexed(base: impl Into<String>, index: u32) -> Self {
        Self {
            base: base.into(),
            index: Some(index),
        }
    }

    /// Parses a wire identifier, splitting off a `_idx_<digits>` suffix.
    pub fn parse(raw: &str) -> Self {
        match split_index_suffix(raw) {
            Some((base, index)) => Self::indexed(base, index),
            None => Self::new(raw),
        }
    }

    /// Strips a known index suffix from a raw wire identifier.
    ///
    /// Identifiers without a suffix are returned unchanged.
    pub fn base_of(raw: &str) -> &str {
        split_index_suffix(raw).map_or(raw, |(base, _)| base)
    }

    /// The identifier without its occurrence index.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The occurrence index, if any.
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// Returns a copy carrying the given occurrence index.
    #[must_use]
    pub fn with_index(&self, index: u32) -> Self {
        Self::indexed(self.base.clone(), index)
    }

    /// Returns a copy with the occurrence index dropped.
    #[must_use]
    pub fn without_index(&self) -> Self {
        Self::new(self.base.clone())
    }

    /// Whether both identifiers share the same base.
    pub fn same_base(&self, other: &SemanticId) -> bool {
        self.base == other.base
    }

    /// The string form used on the wire, suffix included.
    pub fn encoded(&self) -> String {
        self.to_string()
    }

    /// Whether this is the anonymous identifier of a parsed multi-property root.
    pub fn is_anonymous(&self) -> bool {
        self.base.is_empty() && self.index.is_none()
    }
}

fn split_index_suffix(raw: &str) -> Option<(&str, u32)> {
    let (head, digits) = raw.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base = head.strip_suffix(INDEX_MARKER)?.strip_suffix('_')?;
    if base.is_empty() {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((base, index))
}

impl fmt::Display for SemanticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}_{INDEX_MARKER}_{index:02}", self.base),
            None => f.write_str(&self.base),
        }
    }
}

impl From<String> for SemanticId {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for SemanticId {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<SemanticId> for String {
    fn from(id: SemanticId) -> Self {
        id.encoded()
    }
}
