//! Worker configuration.
//!
//! The cache identifier and asset list are scoped to one registration and
//! passed to the worker at construction.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ServiceWorkerError;

/// Cache identifier of the current asset generation.
pub const DEFAULT_CACHE_NAME: &str = "notif-generator-v1";

/// Assets pre-cached at install, relative to the worker scope.
pub const DEFAULT_ASSETS: &[&str] = &[
    "./",
    "index.html",
    "manifest.json",
    "icon1.png",
    "icon192.png",
    "favicon.ico",
];

/// Configuration for one worker generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Registration scope; its origin is the worker origin.
    pub scope: Url,

    /// Current cache identifier. Every other cache is stale.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Ordered asset list, resolved against `scope`.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Window opened or focused on notification click.
    #[serde(default = "default_app_root")]
    pub app_root: String,

    /// Activate right after install instead of waiting for pages to close.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Take control of already open pages on activation.
    #[serde(default = "default_true")]
    pub claim_clients: bool,
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.to_string()
}

fn default_assets() -> Vec<String> {
    DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_app_root() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

impl WorkerConfig {
    /// Create a configuration with the default cache name and asset list.
    pub fn new(scope: Url) -> Self {
        Self {
            scope,
            cache_name: default_cache_name(),
            assets: default_assets(),
            app_root: default_app_root(),
            skip_waiting: true,
            claim_clients: true,
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ServiceWorkerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ServiceWorkerError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the cache identifier.
    #[must_use]
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    /// Replace the asset list.
    #[must_use]
    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the app root opened on notification click.
    #[must_use]
    pub fn with_app_root(mut self, root: impl Into<String>) -> Self {
        self.app_root = root.into();
        self
    }

    /// Set whether install requests immediate activation.
    #[must_use]
    pub fn with_skip_waiting(mut self, skip: bool) -> Self {
        self.skip_waiting = skip;
        self
    }

    /// Set whether activation claims open pages.
    #[must_use]
    pub fn with_claim_clients(mut self, claim: bool) -> Self {
        self.claim_clients = claim;
        self
    }

    /// Check the configuration before a worker is built from it.
    pub fn validate(&self) -> Result<(), ServiceWorkerError> {
        if self.cache_name.trim().is_empty() {
            return Err(ServiceWorkerError::ConfigError(
                "cache name must not be empty".to_string(),
            ));
        }
        if !matches!(self.scope.scheme(), "http" | "https") {
            return Err(ServiceWorkerError::ConfigError(format!(
                "scope must be http(s), got {}",
                self.scope
            )));
        }
        self.resolve_assets()?;
        self.app_url()?;
        Ok(())
    }

    /// Serialized origin of the scope, e.g. `https://app.example`.
    pub fn origin(&self) -> String {
        self.scope.origin().ascii_serialization()
    }

    /// Absolute URL of the app root.
    pub fn app_url(&self) -> Result<Url, ServiceWorkerError> {
        self.scope
            .join(&self.app_root)
            .map_err(|e| ServiceWorkerError::ConfigError(format!("app root {}: {e}", self.app_root)))
    }

    /// Resolve the asset list to absolute URLs, keeping its order.
    pub fn resolve_assets(&self) -> Result<Vec<Url>, ServiceWorkerError> {
        self.assets
            .iter()
            .map(|asset| {
                self.scope
                    .join(asset)
                    .map_err(|e| ServiceWorkerError::ConfigError(format!("asset {asset}: {e}")))
            })
            .collect()
    }
}
