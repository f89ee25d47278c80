//! Federation of semantic trees across independently deployed plugins.
//!
//! # Architecture
//!
//! A client asks for a document shaped by a template tree. The engine:
//!
//! 1. **Split**: partitions the template into one sub-tree per plugin, using
//!    the coverage map resolved once at startup
//! 2. **Contract**: renders each sub-tree as a JSON Schema and checks it
//!    against the draft-07 meta-schema
//! 3. **Dispatch**: sends every plugin request concurrently through a
//!    [`PluginTransport`]
//! 4. **Interpret**: validates each answer against its contract and parses it
//!    back into a tree
//! 5. **Merge**: folds the answers into one tree shaped by the template,
//!    honoring each node's cardinality
//!
//! Asset listing and lookup by id skip the tree entirely: plugins are picked
//! by capability flag and their answers are read as fixed records.
//!
//! # Example
//!
//! ```
//! use semfed_federation::{FederationConfig, PluginEndpoint};
//!
//! let config = FederationConfig {
//!     plugins: vec![PluginEndpoint::new("erp", "http://erp.local")],
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

mod config;
mod engine;
mod error;
pub mod http;
mod merge;
mod metadata;
mod partition;
pub mod transport;

pub use config::{FederationConfig, PluginEndpoint};
pub use engine::FederationEngine;
pub use error::{ErrorClass, FederationError, FederationResult};
pub use http::HttpPluginTransport;
pub use merge::merge;
pub use metadata::{AssetDescriptor, MetadataQuery, MetadataRequest};
pub use partition::{split, validate_coverage};
pub use transport::{PluginTransport, TransportError, TransportResult, UpstreamErrorKind};
