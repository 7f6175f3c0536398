//! Offline cache manager: the worker's event handlers.
//!
//! Every event goes through [`OfflineCacheManager::dispatch`]; the returned
//! future is what the host awaits before it lets the event end.

use std::sync::Arc;

use futures::future::try_join_all;
use notif_common::CommonError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::cache::{CacheEntry, CacheStorage};
use crate::clients::{ClientId, ClientMatchOptions, ClientType, Clients};
use crate::config::WorkerConfig;
use crate::lifecycle::{LifecycleEvent, ServiceWorker, ServiceWorkerId, ServiceWorkerState};
use crate::network::{FetchRequest, FetchResponse, Network};
use crate::notification::Notification;
use crate::ServiceWorkerError;

// ==================== Events ====================

/// Events delivered to the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    NotificationClick(Notification),
    NotificationClose(Notification),
}

impl WorkerEvent {
    fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Fetch(_) => "fetch",
            WorkerEvent::NotificationClick(_) => "notificationclick",
            WorkerEvent::NotificationClose(_) => "notificationclose",
        }
    }
}

/// How a fetch event was answered.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchDisposition {
    /// The worker answered the request.
    Respond(FetchResponse),
    /// Not intercepted; the host applies default network behavior.
    Passthrough,
}

/// Result of a handled event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// All assets were stored in the current cache.
    Installed { cached: usize },
    /// Stale caches deleted and pages claimed.
    Activated {
        deleted: Vec<String>,
        claimed: Vec<ClientId>,
    },
    Fetch(FetchDisposition),
    WindowFocused(ClientId),
    WindowOpened(ClientId),
    NotificationClosed,
}

// ==================== Manager ====================

/// One worker generation.
pub struct OfflineCacheManager {
    id: ServiceWorkerId,
    config: WorkerConfig,
    worker: RwLock<ServiceWorker>,
    caches: Arc<RwLock<CacheStorage>>,
    clients: Arc<RwLock<Clients>>,
    network: Arc<dyn Network>,
    event_tx: Option<mpsc::UnboundedSender<LifecycleEvent>>,
}

impl OfflineCacheManager {
    /// Create a worker generation over the host's cache storage, clients and network.
    pub fn new(
        config: WorkerConfig,
        caches: Arc<RwLock<CacheStorage>>,
        clients: Arc<RwLock<Clients>>,
        network: Arc<dyn Network>,
    ) -> Result<Self, ServiceWorkerError> {
        config.validate()?;
        let worker = ServiceWorker::new(config.scope.clone());

        Ok(Self {
            id: worker.id,
            config,
            worker: RwLock::new(worker),
            caches,
            clients,
            network,
            event_tx: None,
        })
    }

    /// Publish lifecycle events on `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<LifecycleEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn id(&self) -> ServiceWorkerId {
        self.id
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ServiceWorkerState {
        self.worker.read().await.state
    }

    /// Whether a successful install asked to activate without waiting.
    pub async fn skip_waiting_requested(&self) -> bool {
        self.worker.read().await.skip_waiting
    }

    /// Error recorded by a failed install.
    pub async fn install_error(&self) -> Option<String> {
        self.worker.read().await.error.clone()
    }

    /// Single entry point for all worker events.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, ServiceWorkerError> {
        trace!(worker = self.id.raw(), event = event.name(), "Dispatching event");

        match event {
            WorkerEvent::Install => self.install().await,
            WorkerEvent::Activate => self.activate().await,
            WorkerEvent::Fetch(request) => self.fetch(&request).await.map(EventOutcome::Fetch),
            WorkerEvent::NotificationClick(notification) => {
                self.notification_click(&notification).await
            }
            WorkerEvent::NotificationClose(notification) => {
                self.notification_close(&notification);
                Ok(EventOutcome::NotificationClosed)
            }
        }
    }

    // ==================== Install ====================

    /// Pre-cache every configured asset, all or nothing.
    pub async fn install(&self) -> Result<EventOutcome, ServiceWorkerError> {
        self.transition(ServiceWorkerState::Installing).await?;
        info!(
            worker = self.id.raw(),
            cache = %self.config.cache_name,
            assets = self.config.assets.len(),
            "Installing and pre-caching assets"
        );

        match self.precache().await {
            Ok(cached) => {
                {
                    let mut worker = self.worker.write().await;
                    worker.skip_waiting = self.config.skip_waiting;
                }
                self.transition(ServiceWorkerState::Installed).await?;
                info!(worker = self.id.raw(), cached, "Install complete");
                Ok(EventOutcome::Installed { cached })
            }
            Err(e) => {
                let common = CommonError::from(e.clone());
                error!(
                    worker = self.id.raw(),
                    error = %e,
                    category = common.category(),
                    retryable = common.is_retryable(),
                    "Pre-caching failed"
                );
                {
                    let mut worker = self.worker.write().await;
                    worker.error = Some(e.to_string());
                }
                self.transition(ServiceWorkerState::Redundant).await?;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, ServiceWorkerError> {
        let urls = self.config.resolve_assets()?;

        // Nothing is written until every asset has been fetched.
        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_asset(url))).await?;

        let mut caches = self.caches.write().await;
        let cache = caches.open(&self.config.cache_name);
        cache.put_all(entries);
        Ok(cache.len())
    }

    async fn fetch_asset(&self, url: Url) -> Result<CacheEntry, ServiceWorkerError> {
        let request = FetchRequest::get(url);
        let response = self.network.fetch(&request).await.map_err(|e| {
            ServiceWorkerError::InstallFailed {
                url: request.url.to_string(),
                reason: e.to_string(),
            }
        })?;

        if !response.ok() {
            return Err(ServiceWorkerError::InstallFailed {
                url: request.url.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        debug!(url = %request.url, bytes = response.body.len(), "Asset fetched");
        Ok(CacheEntry::from_response(&request, response))
    }

    // ==================== Activate ====================

    /// Delete every cache but the current one, then claim open pages.
    pub async fn activate(&self) -> Result<EventOutcome, ServiceWorkerError> {
        self.transition(ServiceWorkerState::Activating).await?;
        info!(worker = self.id.raw(), cache = %self.config.cache_name, "Activating and deleting stale caches");

        let stale: Vec<String> = self
            .caches
            .read()
            .await
            .keys()
            .into_iter()
            .filter(|name| *name != self.config.cache_name)
            .collect();

        let deletions = stale.into_iter().map(|name| {
            let caches = Arc::clone(&self.caches);
            async move {
                info!(cache = %name, "Deleting stale cache");
                let deleted = caches.write().await.delete(&name);
                Ok::<_, ServiceWorkerError>(deleted.then_some(name))
            }
        });
        let deleted: Vec<String> = try_join_all(deletions).await?.into_iter().flatten().collect();

        let claimed = if self.config.claim_clients {
            self.claim().await
        } else {
            Vec::new()
        };

        self.transition(ServiceWorkerState::Activated).await?;
        Ok(EventOutcome::Activated { deleted, claimed })
    }

    async fn claim(&self) -> Vec<ClientId> {
        let claimed = self
            .clients
            .write()
            .await
            .claim(self.id, &self.config.scope);

        for client_id in &claimed {
            self.emit(LifecycleEvent::ControllerChange {
                client_id: *client_id,
                worker_id: self.id,
            });
        }
        debug!(worker = self.id.raw(), claimed = claimed.len(), "Clients claimed");
        claimed
    }

    /// Mark this generation redundant. Retiring twice is a no-op.
    pub async fn retire(&self) -> Result<(), ServiceWorkerError> {
        if self.worker.read().await.is_redundant() {
            return Ok(());
        }
        self.transition(ServiceWorkerState::Redundant).await
    }

    // ==================== Fetch ====================

    /// Cache-first for same-origin requests; the cache is never written here.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchDisposition, ServiceWorkerError> {
        if !self.is_same_origin(&request.url) {
            trace!(url = %request.url, "Cross-origin request, not intercepted");
            return Ok(FetchDisposition::Passthrough);
        }

        if !self.worker.read().await.is_active() {
            debug!(url = %request.url, "Worker not activated, not intercepted");
            return Ok(FetchDisposition::Passthrough);
        }

        let cached = self
            .caches
            .read()
            .await
            .get(&self.config.cache_name)
            .and_then(|cache| cache.match_request(request))
            .map(FetchResponse::from_cache);

        if let Some(response) = cached {
            debug!(url = %request.url, "Serving from cache");
            return Ok(FetchDisposition::Respond(response));
        }

        debug!(url = %request.url, "Cache miss, fetching from network");
        let response = match self.network.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Network fetch failed");
                FetchResponse::network_error()
            }
        };
        Ok(FetchDisposition::Respond(response))
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.config.scope.origin()
    }

    // ==================== Notifications ====================

    /// Close the notification, then focus an app window or open one.
    pub async fn notification_click(
        &self,
        notification: &Notification,
    ) -> Result<EventOutcome, ServiceWorkerError> {
        notification.close();

        let target = self.config.app_url()?;
        let origin = self.config.origin();
        let options = ClientMatchOptions {
            include_uncontrolled: true,
            client_type: ClientType::Window,
        };

        let mut clients = self.clients.write().await;
        let matching = clients
            .match_all(self.id, &options)
            .into_iter()
            .find(|c| c.url == target || c.url.as_str().starts_with(&origin))
            .map(|c| c.id);

        match matching {
            Some(id) => {
                clients.focus(id)?;
                info!(tag = %notification.tag, client = id.raw(), "Focused existing window");
                Ok(EventOutcome::WindowFocused(id))
            }
            None => {
                let controller = self.worker.read().await.is_active().then_some(self.id);
                let id = clients.open_window(target.clone(), controller)?.id;
                info!(tag = %notification.tag, url = %target, "Opened new window");
                Ok(EventOutcome::WindowOpened(id))
            }
        }
    }

    /// Closing a notification is only logged.
    pub fn notification_close(&self, notification: &Notification) {
        info!(tag = %notification.tag, "Notification closed");
    }

    // ==================== Helpers ====================

    async fn transition(&self, next: ServiceWorkerState) -> Result<(), ServiceWorkerError> {
        self.worker.write().await.transition(next)?;
        debug!(worker = self.id.raw(), state = %next, "State changed");
        self.emit(LifecycleEvent::StateChange {
            worker_id: self.id,
            new_state: next,
        });
        Ok(())
    }

    fn emit(&self, event: LifecycleEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hashbrown::HashMap;
    use http::HeaderMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed set of URLs and counts every request.
    #[derive(Default)]
    struct StubNetwork {
        responses: HashMap<String, (u16, Vec<u8>)>,
        offline: bool,
        calls: AtomicUsize,
    }

    impl StubNetwork {
        fn serving(paths: &[(&str, &[u8])]) -> Self {
            Self {
                responses: paths
                    .iter()
                    .map(|(url, body)| (url.to_string(), (200, body.to_vec())))
                    .collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, ServiceWorkerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(ServiceWorkerError::NetworkError("offline".to_string()));
            }
            let (status, body) = self
                .responses
                .get(request.url.as_str())
                .cloned()
                .unwrap_or((404, Vec::new()));
            Ok(FetchResponse {
                status,
                status_text: String::new(),
                headers: HeaderMap::new(),
                body,
                from_cache: false,
            })
        }
    }

    struct Harness {
        manager: OfflineCacheManager,
        caches: Arc<RwLock<CacheStorage>>,
        clients: Arc<RwLock<Clients>>,
        network: Arc<StubNetwork>,
    }

    fn scope() -> Url {
        Url::parse("https://app.example/").unwrap()
    }

    fn harness(config: WorkerConfig, network: StubNetwork) -> Harness {
        let caches = Arc::new(RwLock::new(CacheStorage::new()));
        let clients = Arc::new(RwLock::new(Clients::new()));
        let network = Arc::new(network);
        let manager = OfflineCacheManager::new(
            config,
            Arc::clone(&caches),
            Arc::clone(&clients),
            network.clone(),
        )
        .unwrap();
        Harness {
            manager,
            caches,
            clients,
            network,
        }
    }

    fn two_asset_harness() -> Harness {
        let config = WorkerConfig::new(scope()).with_assets(["./", "index.html"]);
        let network = StubNetwork::serving(&[
            ("https://app.example/", b"root"),
            ("https://app.example/index.html", b"index"),
        ]);
        harness(config, network)
    }

    async fn activated() -> Harness {
        let h = two_asset_harness();
        h.manager.dispatch(WorkerEvent::Install).await.unwrap();
        h.manager.dispatch(WorkerEvent::Activate).await.unwrap();
        h
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn get(url: &str) -> WorkerEvent {
        WorkerEvent::Fetch(FetchRequest::get(Url::parse(url).unwrap()))
    }

    #[tokio::test]
    async fn test_install_caches_every_asset() {
        let h = two_asset_harness();

        let outcome = h.manager.dispatch(WorkerEvent::Install).await.unwrap();
        assert_eq!(outcome, EventOutcome::Installed { cached: 2 });
        assert_eq!(h.manager.state().await, ServiceWorkerState::Installed);
        assert!(h.manager.skip_waiting_requested().await);

        let caches = h.caches.read().await;
        let cache = caches.get("notif-generator-v1").unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.match_url(&url("https://app.example/")).unwrap().body, b"root");
        assert_eq!(
            cache.match_url(&url("https://app.example/index.html")).unwrap().body,
            b"index"
        );
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let config = WorkerConfig::new(scope()).with_assets(["./", "missing.png"]);
        let network = StubNetwork::serving(&[("https://app.example/", b"root")]);
        let h = harness(config, network);

        let err = h.manager.dispatch(WorkerEvent::Install).await.unwrap_err();
        assert!(matches!(err, ServiceWorkerError::InstallFailed { .. }));
        assert_eq!(h.manager.state().await, ServiceWorkerState::Redundant);
        assert!(h.manager.install_error().await.is_some());
        assert!(!h.caches.read().await.has("notif-generator-v1"));
    }

    #[tokio::test]
    async fn test_install_offline_fails() {
        let network = StubNetwork {
            offline: true,
            ..Default::default()
        };
        let h = harness(WorkerConfig::new(scope()), network);

        assert!(h.manager.dispatch(WorkerEvent::Install).await.is_err());
        assert!(h.caches.read().await.keys().is_empty());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_caches() {
        let h = two_asset_harness();
        h.caches.write().await.open("notif-generator-v0");
        h.manager.dispatch(WorkerEvent::Install).await.unwrap();

        let outcome = h.manager.dispatch(WorkerEvent::Activate).await.unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Activated {
                deleted: vec!["notif-generator-v0".to_string()],
                claimed: vec![],
            }
        );
        assert_eq!(h.caches.read().await.keys(), vec!["notif-generator-v1"]);
        assert_eq!(h.manager.state().await, ServiceWorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let h = two_asset_harness();
        assert!(matches!(
            h.manager.dispatch(WorkerEvent::Activate).await,
            Err(ServiceWorkerError::StateError(_))
        ));
    }

    #[tokio::test]
    async fn test_activate_claims_open_pages() {
        let h = two_asset_harness();
        let page = h
            .clients
            .write()
            .await
            .add(Url::parse("https://app.example/index.html").unwrap(), ClientType::Window);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let manager = OfflineCacheManager::new(
            h.manager.config().clone(),
            Arc::clone(&h.caches),
            Arc::clone(&h.clients),
            h.network.clone(),
        )
        .unwrap()
        .with_events(tx);

        manager.dispatch(WorkerEvent::Install).await.unwrap();
        let outcome = manager.dispatch(WorkerEvent::Activate).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Activated { ref claimed, .. } if claimed == &vec![page]));
        assert_eq!(h.clients.read().await.get(page).unwrap().controller, Some(manager.id()));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&LifecycleEvent::ControllerChange {
            client_id: page,
            worker_id: manager.id(),
        }));
        assert_eq!(
            events.last(),
            Some(&LifecycleEvent::StateChange {
                worker_id: manager.id(),
                new_state: ServiceWorkerState::Activated,
            })
        );
    }

    #[tokio::test]
    async fn test_retire_twice_is_noop() {
        let h = activated().await;
        h.manager.retire().await.unwrap();
        h.manager.retire().await.unwrap();
        assert_eq!(h.manager.state().await, ServiceWorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_fetch_serves_cached_without_network() {
        let h = activated().await;
        let calls_after_install = h.network.calls();

        let outcome = h.manager.dispatch(get("https://app.example/index.html")).await.unwrap();
        match outcome {
            EventOutcome::Fetch(FetchDisposition::Respond(response)) => {
                assert!(response.from_cache);
                assert_eq!(response.body, b"index");
            }
            other => panic!("Expected cached response, got {other:?}"),
        }
        assert_eq!(h.network.calls(), calls_after_install);
    }

    #[tokio::test]
    async fn test_fetch_with_fragment_is_served_from_cache() {
        let h = activated().await;
        let calls_after_install = h.network.calls();

        let outcome = h.manager.dispatch(get("https://app.example/index.html#top")).await.unwrap();
        match outcome {
            EventOutcome::Fetch(FetchDisposition::Respond(response)) => {
                assert!(response.from_cache);
                assert_eq!(response.body, b"index");
            }
            other => panic!("Expected cached response, got {other:?}"),
        }
        assert_eq!(h.network.calls(), calls_after_install);
    }

    #[tokio::test]
    async fn test_fetch_post_skips_cache() {
        let h = activated().await;
        let calls_after_install = h.network.calls();

        let request = FetchRequest::post(url("https://app.example/index.html"), "draft".into());
        let outcome = h.manager.dispatch(WorkerEvent::Fetch(request)).await.unwrap();
        match outcome {
            EventOutcome::Fetch(FetchDisposition::Respond(response)) => assert!(!response.from_cache),
            other => panic!("Expected network response, got {other:?}"),
        }
        assert_eq!(h.network.calls(), calls_after_install + 1);
    }

    #[tokio::test]
    async fn test_fetch_miss_goes_to_network_and_is_not_cached() {
        let h = activated().await;

        let outcome = h.manager.dispatch(get("https://app.example/api/data.json")).await.unwrap();
        match outcome {
            EventOutcome::Fetch(FetchDisposition::Respond(response)) => {
                assert!(!response.from_cache);
                assert_eq!(response.status, 404);
            }
            other => panic!("Expected network response, got {other:?}"),
        }

        let caches = h.caches.read().await;
        assert!(caches
            .get("notif-generator-v1")
            .unwrap()
            .match_url(&url("https://app.example/api/data.json"))
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_network_failure_is_network_error_response() {
        let network = StubNetwork {
            offline: true,
            ..Default::default()
        };
        let h = harness(WorkerConfig::new(scope()).with_assets(Vec::<String>::new()), network);
        h.manager.dispatch(WorkerEvent::Install).await.unwrap();
        h.manager.dispatch(WorkerEvent::Activate).await.unwrap();

        let outcome = h.manager.dispatch(get("https://app.example/live")).await.unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Fetch(FetchDisposition::Respond(FetchResponse::network_error()))
        );
    }

    #[tokio::test]
    async fn test_fetch_cross_origin_passes_through() {
        let h = activated().await;
        let calls = h.network.calls();

        let outcome = h.manager.dispatch(get("https://cdn.example/lib.js")).await.unwrap();
        assert_eq!(outcome, EventOutcome::Fetch(FetchDisposition::Passthrough));
        assert_eq!(h.network.calls(), calls);
    }

    #[tokio::test]
    async fn test_fetch_before_activation_passes_through() {
        let h = two_asset_harness();
        h.manager.dispatch(WorkerEvent::Install).await.unwrap();

        let outcome = h.manager.dispatch(get("https://app.example/")).await.unwrap();
        assert_eq!(outcome, EventOutcome::Fetch(FetchDisposition::Passthrough));
    }

    #[tokio::test]
    async fn test_notification_click_opens_window_when_none_open() {
        let h = activated().await;
        let notification = Notification::new("daily", "Reminder");

        let outcome = h
            .manager
            .dispatch(WorkerEvent::NotificationClick(notification.clone()))
            .await
            .unwrap();

        assert!(notification.is_closed());
        let id = match outcome {
            EventOutcome::WindowOpened(id) => id,
            other => panic!("Expected a new window, got {other:?}"),
        };
        let clients = h.clients.read().await;
        let client = clients.get(id).unwrap();
        assert_eq!(client.url.as_str(), "https://app.example/");
        assert!(client.focused);
        assert_eq!(client.controller, Some(h.manager.id()));
    }

    #[tokio::test]
    async fn test_notification_click_focuses_open_root_window() {
        let h = activated().await;
        let root = h
            .clients
            .write()
            .await
            .add(Url::parse("https://app.example/").unwrap(), ClientType::Window);

        let notification = Notification::new("daily", "Reminder");
        let outcome = h
            .manager
            .dispatch(WorkerEvent::NotificationClick(notification.clone()))
            .await
            .unwrap();

        assert_eq!(outcome, EventOutcome::WindowFocused(root));
        assert!(notification.is_closed());
        let clients = h.clients.read().await;
        assert_eq!(clients.len(), 1);
        assert!(clients.get(root).unwrap().focused);
    }

    #[tokio::test]
    async fn test_notification_click_focuses_first_same_origin_window() {
        let h = activated().await;
        let first;
        {
            let mut clients = h.clients.write().await;
            clients.add(Url::parse("https://elsewhere.example/").unwrap(), ClientType::Window);
            first = clients.add(Url::parse("https://app.example/settings").unwrap(), ClientType::Window);
            clients.add(Url::parse("https://app.example/").unwrap(), ClientType::Window);
        }

        let outcome = h
            .manager
            .notification_click(&Notification::new("daily", "Reminder"))
            .await
            .unwrap();
        assert_eq!(outcome, EventOutcome::WindowFocused(first));
    }

    #[tokio::test]
    async fn test_notification_click_ignores_other_origins() {
        let h = activated().await;
        h.clients
            .write()
            .await
            .add(Url::parse("https://elsewhere.example/").unwrap(), ClientType::Window);

        let outcome = h
            .manager
            .notification_click(&Notification::new("daily", "Reminder"))
            .await
            .unwrap();
        assert!(matches!(outcome, EventOutcome::WindowOpened(_)));
        assert_eq!(h.clients.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_notification_close_changes_nothing() {
        let h = activated().await;
        let notification = Notification::new("daily", "Reminder");

        let outcome = h
            .manager
            .dispatch(WorkerEvent::NotificationClose(notification.clone()))
            .await
            .unwrap();
        assert_eq!(outcome, EventOutcome::NotificationClosed);
        assert!(h.clients.read().await.is_empty());
        assert_eq!(h.manager.state().await, ServiceWorkerState::Activated);
    }
}
