//! Error types for manifest processing.

use thiserror::Error;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors raised while turning manifests into a coverage map.
///
/// Both are fatal to startup; neither is retried.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// An id is declared more than once under `ConflictPolicy::ThrowError`.
    #[error("semantic id '{id}' is declared more than once (by {plugins:?})")]
    Conflict { id: String, plugins: Vec<String> },

    /// Two manifests share one plugin name.
    #[error("duplicate plugin name: {0}")]
    DuplicatePlugin(String),
}
