//! Registration: owns the worker generations of one scope and routes events
//! to the active one.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::CacheStorage;
use crate::clients::Clients;
use crate::config::WorkerConfig;
use crate::lifecycle::LifecycleEvent;
use crate::manager::{EventOutcome, FetchDisposition, OfflineCacheManager, WorkerEvent};
use crate::network::{FetchRequest, Network};
use crate::notification::Notification;
use crate::ServiceWorkerError;

/// A service worker registration.
pub struct ServiceWorkerRegistration {
    /// Scope URL.
    scope: Url,

    /// Cache storage shared by every generation.
    caches: Arc<RwLock<CacheStorage>>,

    /// Clients visible to the registration.
    clients: Arc<RwLock<Clients>>,

    network: Arc<dyn Network>,

    /// Installed generation waiting for activation.
    waiting: RwLock<Option<Arc<OfflineCacheManager>>>,

    /// Active generation.
    active: RwLock<Option<Arc<OfflineCacheManager>>>,

    /// Event sender for lifecycle changes.
    event_tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ServiceWorkerRegistration {
    /// Create a registration for `scope`.
    pub fn new(
        scope: Url,
        network: Arc<dyn Network>,
    ) -> (Self, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            Self {
                scope,
                caches: Arc::new(RwLock::new(CacheStorage::new())),
                clients: Arc::new(RwLock::new(Clients::new())),
                network,
                waiting: RwLock::new(None),
                active: RwLock::new(None),
                event_tx,
            },
            event_rx,
        )
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Cache storage handle.
    pub fn caches(&self) -> Arc<RwLock<CacheStorage>> {
        Arc::clone(&self.caches)
    }

    /// Clients handle.
    pub fn clients(&self) -> Arc<RwLock<Clients>> {
        Arc::clone(&self.clients)
    }

    /// Active generation, if any.
    pub async fn active(&self) -> Option<Arc<OfflineCacheManager>> {
        self.active.read().await.clone()
    }

    /// Waiting generation, if any.
    pub async fn waiting(&self) -> Option<Arc<OfflineCacheManager>> {
        self.waiting.read().await.clone()
    }

    /// Install a new generation from `config`.
    ///
    /// On install failure the previous active generation keeps serving and the
    /// error is returned; calling `register` again retries the install.
    pub async fn register(
        &self,
        config: WorkerConfig,
    ) -> Result<Arc<OfflineCacheManager>, ServiceWorkerError> {
        if config.scope.origin() != self.scope.origin() {
            return Err(ServiceWorkerError::SecurityError(format!(
                "worker scope {} is not same-origin with {}",
                config.scope, self.scope
            )));
        }

        let worker = OfflineCacheManager::new(
            config,
            Arc::clone(&self.caches),
            Arc::clone(&self.clients),
            Arc::clone(&self.network),
        )
        .map_err(|e| ServiceWorkerError::RegistrationFailed(e.to_string()))?
        .with_events(self.event_tx.clone());
        let worker = Arc::new(worker);

        let _ = self.event_tx.send(LifecycleEvent::UpdateFound {
            scope: self.scope.to_string(),
        });

        if let Err(e) = worker.dispatch(WorkerEvent::Install).await {
            if self.active.read().await.is_some() {
                warn!(scope = %self.scope, error = %e, "Install failed, keeping active worker");
            }
            return Err(e);
        }

        let replaced_waiting = self.waiting.write().await.replace(Arc::clone(&worker));
        if let Some(old) = replaced_waiting {
            old.retire().await?;
        }

        let has_active = self.active.read().await.is_some();
        if worker.skip_waiting_requested().await || !has_active {
            self.activate_waiting().await?;
        } else {
            info!(worker = worker.id().raw(), "Installed, waiting for clients to close");
        }

        Ok(worker)
    }

    /// Activate the waiting generation, retiring the current active one.
    pub async fn activate_waiting(
        &self,
    ) -> Result<Option<Arc<OfflineCacheManager>>, ServiceWorkerError> {
        let Some(worker) = self.waiting.write().await.take() else {
            return Ok(None);
        };

        if let Err(e) = worker.dispatch(WorkerEvent::Activate).await {
            warn!(worker = worker.id().raw(), error = %e, "Activation failed, discarding generation");
            worker.retire().await?;
            return Err(e);
        }

        let previous = self.active.write().await.replace(Arc::clone(&worker));
        if let Some(previous) = previous {
            debug!(worker = previous.id().raw(), "Retiring previous generation");
            previous.retire().await?;
        }

        info!(worker = worker.id().raw(), scope = %self.scope, "Worker activated");
        Ok(Some(worker))
    }

    /// Route a page request to the active generation.
    pub async fn handle_fetch(
        &self,
        request: FetchRequest,
    ) -> Result<FetchDisposition, ServiceWorkerError> {
        match self.active().await {
            Some(worker) => worker.fetch(&request).await,
            None => Ok(FetchDisposition::Passthrough),
        }
    }

    /// Route a notification click to the active generation.
    pub async fn handle_notification_click(
        &self,
        notification: Notification,
    ) -> Result<EventOutcome, ServiceWorkerError> {
        let worker = self.require_active().await?;
        worker
            .dispatch(WorkerEvent::NotificationClick(notification))
            .await
    }

    /// Route a notification close to the active generation.
    pub async fn handle_notification_close(
        &self,
        notification: Notification,
    ) -> Result<EventOutcome, ServiceWorkerError> {
        let worker = self.require_active().await?;
        worker
            .dispatch(WorkerEvent::NotificationClose(notification))
            .await
    }

    /// Retire every generation. Cache storage is left untouched.
    pub async fn unregister(&self) -> Result<bool, ServiceWorkerError> {
        let mut removed = false;
        for slot in [&self.waiting, &self.active] {
            if let Some(worker) = slot.write().await.take() {
                worker.retire().await?;
                removed = true;
            }
        }
        Ok(removed)
    }

    async fn require_active(&self) -> Result<Arc<OfflineCacheManager>, ServiceWorkerError> {
        self.active()
            .await
            .ok_or_else(|| ServiceWorkerError::NotFound(format!("active worker for {}", self.scope)))
    }
}
