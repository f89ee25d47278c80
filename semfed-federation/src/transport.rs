//! Transport collaborator abstraction.
//!
//! The engine never talks to the network itself. Implementations carry the
//! request to a plugin and hand back the raw body; the engine validates and
//! decodes it.

use crate::config::PluginEndpoint;
use crate::metadata::MetadataRequest;
use async_trait::async_trait;
use semfed_manifest::ResolvedManifest;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Classified reason a plugin call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Timeout,
    Unavailable,
    InvalidResponse,
    Network,
}

impl UpstreamErrorKind {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => UpstreamErrorKind::NotFound,
            401 => UpstreamErrorKind::Unauthorized,
            403 => UpstreamErrorKind::Forbidden,
            408 | 504 => UpstreamErrorKind::Timeout,
            502 | 503 => UpstreamErrorKind::Unavailable,
            _ => UpstreamErrorKind::InvalidResponse,
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpstreamErrorKind::NotFound => "not found",
            UpstreamErrorKind::Unauthorized => "unauthorized",
            UpstreamErrorKind::Forbidden => "forbidden",
            UpstreamErrorKind::Timeout => "timed out",
            UpstreamErrorKind::Unavailable => "unavailable",
            UpstreamErrorKind::InvalidResponse => "invalid response",
            UpstreamErrorKind::Network => "network error",
        };
        f.write_str(name)
    }
}

/// A failed plugin call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: UpstreamErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Carries requests to plugins.
#[async_trait]
pub trait PluginTransport: Send + Sync {
    /// Fetches the raw manifest body of a configured plugin.
    async fn fetch_manifest(&self, endpoint: &PluginEndpoint) -> TransportResult<String>;

    /// Sends a JSON Schema contract and returns the raw answer.
    async fn request_tree(&self, plugin: &ResolvedManifest, schema: &Value)
    -> TransportResult<String>;

    /// Sends a schema-less metadata request and returns the raw answer.
    async fn request_metadata(&self, request: &MetadataRequest) -> TransportResult<String>;
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use crate::metadata::MetadataQuery;
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    /// Which plugin call a scripted answer belongs to.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum Route {
        Manifest,
        Tree,
        ListAssets,
        AssetById(String),
    }

    impl From<&MetadataQuery> for Route {
        fn from(query: &MetadataQuery) -> Self {
            match query {
                MetadataQuery::ListAssets => Route::ListAssets,
                MetadataQuery::AssetById(id) => Route::AssetById(id.clone()),
            }
        }
    }

    /// Answers calls from a script keyed by plugin name and route.
    ///
    /// Unscripted calls fail with `UpstreamErrorKind::NotFound`.
    #[derive(Default)]
    pub struct MockTransport {
        answers: HashMap<(String, Route), TransportResult<String>>,
        delays: HashMap<String, Duration>,
        tree_requests: Mutex<Vec<(String, Value)>>,
        calls: Mutex<Vec<(String, Route)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Scripts a successful answer.
        #[must_use]
        pub fn with_answer(mut self, plugin: &str, route: Route, body: impl Into<String>) -> Self {
            self.answers
                .insert((plugin.to_string(), route), Ok(body.into()));
            self
        }

        /// Scripts a failure.
        #[must_use]
        pub fn with_failure(mut self, plugin: &str, route: Route, kind: UpstreamErrorKind) -> Self {
            self.answers.insert(
                (plugin.to_string(), route),
                Err(TransportError::new(kind, format!("scripted failure for {plugin}"))),
            );
            self
        }

        /// Delays every answer from `plugin`.
        #[must_use]
        pub fn with_delay(mut self, plugin: &str, delay: Duration) -> Self {
            self.delays.insert(plugin.to_string(), delay);
            self
        }

        /// Schemas sent on the tree path, in call order.
        pub fn tree_requests(&self) -> Vec<(String, Value)> {
            self.tree_requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Every call made, in call order.
        pub fn calls(&self) -> Vec<(String, Route)> {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        async fn answer(&self, plugin: &str, route: Route) -> TransportResult<String> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((plugin.to_string(), route.clone()));
            if let Some(delay) = self.delays.get(plugin) {
                tokio::time::sleep(*delay).await;
            }
            self.answers
                .get(&(plugin.to_string(), route))
                .cloned()
                .unwrap_or_else(|| {
                    Err(TransportError::new(
                        UpstreamErrorKind::NotFound,
                        format!("nothing scripted for {plugin}"),
                    ))
                })
        }
    }

    #[async_trait]
    impl PluginTransport for MockTransport {
        async fn fetch_manifest(&self, endpoint: &PluginEndpoint) -> TransportResult<String> {
            self.answer(&endpoint.name, Route::Manifest).await
        }

        async fn request_tree(
            &self,
            plugin: &ResolvedManifest,
            schema: &Value,
        ) -> TransportResult<String> {
            self.tree_requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((plugin.name.clone(), schema.clone()));
            self.answer(&plugin.name, Route::Tree).await
        }

        async fn request_metadata(&self, request: &MetadataRequest) -> TransportResult<String> {
            self.answer(&request.plugin, Route::from(&request.query)).await
        }
    }
}
