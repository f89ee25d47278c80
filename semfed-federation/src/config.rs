//! Federation configuration, usually read from `semfed.toml`.

use crate::error::{FederationError, FederationResult};
use semfed_manifest::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// A configured plugin. Name and URL are not read from the manifest body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEndpoint {
    pub name: String,
    pub url: String,
}

impl PluginEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Configuration for the federation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Plugins, in manifest iteration order.
    #[serde(default)]
    pub plugins: Vec<PluginEndpoint>,
    /// How semantic ids declared more than once are resolved.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    /// Per-call timeout for the HTTP transport (ms).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            conflict_policy: ConflictPolicy::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl FederationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> FederationResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| FederationError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_from(path: &Path) -> FederationResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FederationError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            plugins = config.plugins.len(),
            policy = ?config.conflict_policy,
            "loaded federation config"
        );
        Ok(config)
    }

    /// Checks plugin names are non-empty and unique, and URLs non-empty.
    pub fn validate(&self) -> FederationResult<()> {
        let mut names = HashSet::new();
        for plugin in &self.plugins {
            if plugin.name.trim().is_empty() {
                return Err(FederationError::Config("plugin name is required".into()));
            }
            if plugin.url.trim().is_empty() {
                return Err(FederationError::Config(format!(
                    "plugin '{}' has no url",
                    plugin.name
                )));
            }
            if !names.insert(plugin.name.as_str()) {
                return Err(FederationError::Config(format!(
                    "duplicate plugin name '{}'",
                    plugin.name
                )));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(FederationError::Config(
                "request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
