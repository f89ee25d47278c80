//! Plugin manifests and the semantic-id coverage map.
//!
//! Every plugin declares which base semantic ids it can answer. Before any
//! request is served, [`resolve`] turns the declared manifests into an
//! immutable [`CoverageMap`] in which each id has at most one owner, applying
//! the process-wide [`ConflictPolicy`] to ids declared more than once.

mod error;
mod manifest;
mod resolver;

pub use error::{ManifestError, ManifestResult};
pub use manifest::{Capabilities, Capability, ManifestBody, PluginManifest};
pub use resolver::{ConflictPolicy, CoverageMap, ResolvedManifest, resolve};
