//! HTTP transport for plugins.
//!
//! Routes, relative to the plugin URL:
//! - `GET manifest`
//! - `POST tree` with the JSON Schema contract as body
//! - `GET assets` and `GET assets/{id}`

use crate::config::{FederationConfig, PluginEndpoint};
use crate::error::{FederationError, FederationResult};
use crate::metadata::MetadataRequest;
use crate::transport::{PluginTransport, TransportError, TransportResult, UpstreamErrorKind};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use semfed_manifest::ResolvedManifest;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Plugin transport over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPluginTransport {
    client: Client,
}

impl HttpPluginTransport {
    /// Creates a transport whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> FederationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FederationError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &FederationConfig) -> FederationResult<Self> {
        Self::new(config.request_timeout())
    }

    /// Uses a caller-provided client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> TransportResult<String> {
        let response = request.send().await.map_err(|e| classify(&e, what))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::new(
                UpstreamErrorKind::from_status(status.as_u16()),
                format!("{what}: HTTP {status}: {body}"),
            ));
        }
        response.text().await.map_err(|e| classify(&e, what))
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{path}", base.trim_end_matches('/'))
}

fn classify(error: &reqwest::Error, what: &str) -> TransportError {
    let kind = if error.is_timeout() {
        UpstreamErrorKind::Timeout
    } else if error.is_connect() {
        UpstreamErrorKind::Unavailable
    } else if error.is_decode() {
        UpstreamErrorKind::InvalidResponse
    } else {
        UpstreamErrorKind::Network
    };
    TransportError::new(kind, format!("{what}: {error}"))
}

#[async_trait]
impl PluginTransport for HttpPluginTransport {
    async fn fetch_manifest(&self, plugin: &PluginEndpoint) -> TransportResult<String> {
        let url = endpoint(&plugin.url, "manifest");
        debug!(plugin = %plugin.name, %url, "fetching manifest");
        self.send(self.client.get(&url), "manifest").await
    }

    async fn request_tree(
        &self,
        plugin: &ResolvedManifest,
        schema: &Value,
    ) -> TransportResult<String> {
        let url = endpoint(&plugin.url, "tree");
        debug!(plugin = %plugin.name, %url, "sending tree contract");
        self.send(self.client.post(&url).json(schema), "tree").await
    }

    async fn request_metadata(&self, request: &MetadataRequest) -> TransportResult<String> {
        let url = endpoint(&request.url, &request.path());
        debug!(plugin = %request.plugin, %url, "sending metadata request");
        self.send(self.client.get(&url), "metadata").await
    }
}
