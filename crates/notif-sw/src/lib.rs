//! # notif-sw
//!
//! Offline cache service worker for the notif-generator web app.
//!
//! ## Features
//!
//! - **Install**: pre-cache a fixed asset list, all or nothing
//! - **Activate**: evict stale cache generations, claim open pages
//! - **Fetch**: cache-first for same-origin requests, network on miss
//! - **Notifications**: focus an open app window or open a new one
//!
//! ## Architecture
//!
//! ```text
//! ServiceWorkerRegistration (scope)
//!     ├── active (OfflineCacheManager)
//!     ├── waiting (OfflineCacheManager)
//!     │
//!     ├── CacheStorage (caches)
//!     │       └── Cache
//!     │               └── Request → CacheEntry
//!     ├── Clients (window clients)
//!     └── Network (HttpNetwork)
//!
//! OfflineCacheManager::dispatch(WorkerEvent) → EventOutcome
//! ```

use notif_common::CommonError;
use thiserror::Error;

pub mod cache;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod network;
pub mod notification;
pub mod registration;

pub use cache::{Cache, CacheEntry, CacheStorage};
pub use clients::{Client, ClientId, ClientMatchOptions, ClientType, Clients, VisibilityState};
pub use config::{WorkerConfig, DEFAULT_ASSETS, DEFAULT_CACHE_NAME};
pub use lifecycle::{LifecycleEvent, ServiceWorker, ServiceWorkerId, ServiceWorkerState};
pub use manager::{EventOutcome, FetchDisposition, OfflineCacheManager, WorkerEvent};
pub use network::{FetchRequest, FetchResponse, HttpNetwork, LoaderConfig, Network};
pub use notification::Notification;
pub use registration::ServiceWorkerRegistration;

// ==================== Errors ====================

/// Errors that can occur in service worker operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceWorkerError {
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("State error: {0}")]
    StateError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Install failed fetching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ServiceWorkerError> for CommonError {
    fn from(err: ServiceWorkerError) -> Self {
        match err {
            ServiceWorkerError::NetworkError(_) | ServiceWorkerError::InstallFailed { .. } => {
                CommonError::network_with_source("service worker", err)
            }
            ServiceWorkerError::CacheError(msg) => CommonError::cache(msg),
            ServiceWorkerError::StateError(msg) => CommonError::state(msg),
            ServiceWorkerError::ConfigError(msg) => CommonError::config(msg),
            ServiceWorkerError::NotFound(what) => CommonError::NotFound(what),
            ServiceWorkerError::RegistrationFailed(msg) | ServiceWorkerError::SecurityError(msg) => {
                CommonError::InvalidArgument(msg)
            }
        }
    }
}
