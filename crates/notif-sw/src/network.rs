//! Network access for cache misses and install-time pre-caching.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Client;
use tracing::{debug, info, trace};
use url::Url;

use crate::cache::CacheEntry;
use crate::ServiceWorkerError;

// ==================== Request ====================

/// A request seen by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Request URL.
    pub url: Url,

    /// Request method.
    pub method: Method,

    /// Request headers.
    pub headers: HeaderMap,

    /// Request body, forwarded as-is on a cache miss.
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a POST request.
    pub fn post(url: Url, body: Bytes) -> Self {
        Self {
            url,
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }
}

// ==================== Response ====================

/// Response handed back to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    /// Status code. `0` for a network error.
    pub status: u16,

    /// Status text.
    pub status_text: String,

    /// Response headers, repeated names and opaque values included.
    pub headers: HeaderMap,

    /// Response body.
    pub body: Vec<u8>,

    /// Whether from cache.
    pub from_cache: bool,
}

impl FetchResponse {
    /// Create a network error response.
    pub fn network_error() -> Self {
        Self {
            status: 0,
            status_text: "Network Error".to_string(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            from_cache: false,
        }
    }

    /// Create a response from cache entry.
    pub fn from_cache(entry: &CacheEntry) -> Self {
        Self {
            status: entry.status,
            status_text: entry.status_text.clone(),
            headers: entry.headers.clone(),
            body: entry.body.clone(),
            from_cache: true,
        }
    }

    /// Check if the status is 2xx.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if this is a network error.
    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }
}

// ==================== Network ====================

/// Live network used on cache miss and at install.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Non-2xx statuses are responses, not errors.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, ServiceWorkerError>;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// User agent string.
    pub user_agent: String,
    /// Default timeout.
    pub timeout: Duration,
    /// Maximum redirects.
    pub max_redirects: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("notif-sw/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// `Network` backed by reqwest.
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    /// Create a new HTTP network.
    pub fn new(config: LoaderConfig) -> Result<Self, ServiceWorkerError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ServiceWorkerError::NetworkError(e.to_string()))?;

        info!(user_agent = %config.user_agent, "HttpNetwork initialized");

        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, ServiceWorkerError> {
        debug!(url = %request.url, method = %request.method, "Fetching from network");

        let mut req_builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ServiceWorkerError::NetworkError(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceWorkerError::NetworkError(e.to_string()))?;

        trace!(url = %request.url, status = %status, body_len = body.len(), "Response received");

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text: status_text(status),
            headers,
            body: body.to_vec(),
            from_cache: false,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
