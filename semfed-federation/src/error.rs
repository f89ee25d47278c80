//! Error types for the federation layer.

use crate::transport::{TransportError, UpstreamErrorKind};
use semfed_manifest::ManifestError;
use semfed_schema::SchemaError;
use thiserror::Error;

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;

/// Errors that can occur while federating a request.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Required semantic ids that no plugin answers.
    #[error("no plugin covers required semantic ids: {missing:?}")]
    IncompleteCoverage { missing: Vec<String> },

    /// The merge reached a node pairing it cannot fold. Always a bug.
    #[error("merge invariant violated: {0}")]
    MergeInvariant(String),

    /// Contract generation, validation, or response parsing failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Conflict resolution rejected the manifests.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A manifest could not be fetched or read at startup.
    #[error("manifest initialization failed: {0}")]
    ManifestInit(String),

    /// One plugin call failed on the tree path.
    #[error("plugin '{plugin}' failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: TransportError,
    },

    /// Every metadata call failed with the same kind.
    #[error("upstream error: {0}")]
    Upstream(UpstreamErrorKind),

    /// Metadata calls failed with a mix of kinds.
    #[error("invalid upstream request")]
    InvalidUpstreamRequest,

    /// Nothing answered for the requested resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// How the surrounding service layer should treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Engine defect; never interpreted or retried.
    Internal,
    /// The requested resource or field cannot exist.
    NotFound,
    /// A plugin or its answer is at fault.
    BadGateway,
    /// Startup cannot proceed.
    Startup,
    /// The caller gave up.
    Cancelled,
}

impl FederationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FederationError::MergeInvariant(_) => ErrorClass::Internal,
            FederationError::Schema(e) if e.is_internal() => ErrorClass::Internal,
            FederationError::IncompleteCoverage { .. } | FederationError::NotFound(_) => {
                ErrorClass::NotFound
            }
            FederationError::Upstream(UpstreamErrorKind::NotFound) => ErrorClass::NotFound,
            FederationError::Schema(_)
            | FederationError::Plugin { .. }
            | FederationError::Upstream(_)
            | FederationError::InvalidUpstreamRequest => ErrorClass::BadGateway,
            FederationError::Manifest(_)
            | FederationError::ManifestInit(_)
            | FederationError::Config(_) => ErrorClass::Startup,
            FederationError::Cancelled => ErrorClass::Cancelled,
        }
    }

    /// True for engine defects the caller must not interpret or retry.
    pub fn is_internal(&self) -> bool {
        self.class() == ErrorClass::Internal
    }
}
