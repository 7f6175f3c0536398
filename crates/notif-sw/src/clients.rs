//! Clients API: window clients visible to the worker.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use url::Url;

use crate::lifecycle::ServiceWorkerId;
use crate::ServiceWorkerError;

/// Unique identifier for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Client type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientType {
    #[default]
    Window,
    Worker,
    SharedWorker,
    All,
}

/// Visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    Visible,
}

/// A client (open page or worker).
#[derive(Debug, Clone)]
pub struct Client {
    /// Client ID.
    pub id: ClientId,

    /// Client URL.
    pub url: Url,

    /// Client type.
    pub client_type: ClientType,

    /// Visibility state.
    pub visibility_state: VisibilityState,

    /// Whether focused.
    pub focused: bool,

    /// Worker generation controlling this client, if any.
    pub controller: Option<ServiceWorkerId>,
}

/// Options for `Clients::match_all`.
#[derive(Debug, Clone, Default)]
pub struct ClientMatchOptions {
    pub include_uncontrolled: bool,
    pub client_type: ClientType,
}

/// Clients registry, in creation order.
#[derive(Debug, Default)]
pub struct Clients {
    clients: Vec<Client>,
}

impl Clients {
    /// Create new clients manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client the host opened itself (not via the worker).
    pub fn add(&mut self, url: Url, client_type: ClientType) -> ClientId {
        let client = Client {
            id: ClientId::new(),
            url,
            client_type,
            visibility_state: VisibilityState::Visible,
            focused: false,
            controller: None,
        };
        let id = client.id;
        self.clients.push(client);
        id
    }

    /// Get a client by ID.
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Number of clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no clients are open.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Match clients visible to `worker`, in creation order.
    pub fn match_all(&self, worker: ServiceWorkerId, options: &ClientMatchOptions) -> Vec<&Client> {
        self.clients
            .iter()
            .filter(|c| options.include_uncontrolled || c.controller == Some(worker))
            .filter(|c| match options.client_type {
                ClientType::All => true,
                t => c.client_type == t,
            })
            .collect()
    }

    /// Focus a window client; every other window loses focus.
    pub fn focus(&mut self, id: ClientId) -> Result<&Client, ServiceWorkerError> {
        let index = self
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ServiceWorkerError::NotFound(format!("client {}", id.raw())))?;

        if self.clients[index].client_type != ClientType::Window {
            return Err(ServiceWorkerError::StateError(
                "Can only focus window clients".to_string(),
            ));
        }

        for client in self.clients.iter_mut() {
            client.focused = client.id == id;
        }

        let client = &mut self.clients[index];
        client.visibility_state = VisibilityState::Visible;
        debug!(client = id.raw(), url = %client.url, "Client focused");
        Ok(&*client)
    }

    /// Open a new focused window.
    pub fn open_window(
        &mut self,
        url: Url,
        controller: Option<ServiceWorkerId>,
    ) -> Result<&Client, ServiceWorkerError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServiceWorkerError::SecurityError(format!(
                "Cannot open window at {url}"
            )));
        }

        let id = self.add(url, ClientType::Window);
        if let Some(client) = self.clients.iter_mut().find(|c| c.id == id) {
            client.controller = controller;
        }
        self.focus(id)
    }

    /// Take control of every window client under `scope`. Returns the newly claimed ids.
    pub fn claim(&mut self, worker: ServiceWorkerId, scope: &Url) -> Vec<ClientId> {
        self.clients
            .iter_mut()
            .filter(|c| c.client_type == ClientType::Window)
            .filter(|c| c.url.as_str().starts_with(scope.as_str()))
            .filter(|c| c.controller != Some(worker))
            .map(|c| {
                c.controller = Some(worker);
                c.id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_open_window() {
        let mut clients = Clients::new();
        let worker = ServiceWorkerId::new();

        let client = clients.open_window(url("https://app.example/"), Some(worker)).unwrap();
        assert_eq!(client.client_type, ClientType::Window);
        assert!(client.focused);
        assert_eq!(client.controller, Some(worker));

        let id = client.id;
        assert!(clients.get(id).is_some());
    }

    #[test]
    fn test_open_window_rejects_non_http() {
        let mut clients = Clients::new();
        assert!(matches!(
            clients.open_window(url("javascript:alert(1)"), None),
            Err(ServiceWorkerError::SecurityError(_))
        ));
        assert!(clients.is_empty());
    }

    #[test]
    fn test_match_all_keeps_creation_order() {
        let mut clients = Clients::new();
        let a = clients.add(url("https://app.example/a"), ClientType::Window);
        let b = clients.add(url("https://app.example/b"), ClientType::Window);
        clients.add(url("https://app.example/w.js"), ClientType::Worker);

        let options = ClientMatchOptions {
            include_uncontrolled: true,
            client_type: ClientType::Window,
        };
        let ids: Vec<ClientId> = clients
            .match_all(ServiceWorkerId::new(), &options)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_match_all_excludes_uncontrolled() {
        let mut clients = Clients::new();
        let worker = ServiceWorkerId::new();
        clients.add(url("https://app.example/"), ClientType::Window);

        let options = ClientMatchOptions::default();
        assert!(clients.match_all(worker, &options).is_empty());

        clients.claim(worker, &url("https://app.example/"));
        assert_eq!(clients.match_all(worker, &options).len(), 1);
    }

    #[test]
    fn test_focus_moves_focus() {
        let mut clients = Clients::new();
        let a = clients.open_window(url("https://app.example/a"), None).unwrap().id;
        let b = clients.add(url("https://app.example/b"), ClientType::Window);

        clients.focus(b).unwrap();
        assert!(!clients.get(a).unwrap().focused);
        assert!(clients.get(b).unwrap().focused);
    }

    #[test]
    fn test_focus_rejects_worker_client() {
        let mut clients = Clients::new();
        let id = clients.add(url("https://app.example/w.js"), ClientType::Worker);
        assert!(matches!(
            clients.focus(id),
            Err(ServiceWorkerError::StateError(_))
        ));
    }

    #[test]
    fn test_claim_only_in_scope() {
        let mut clients = Clients::new();
        let worker = ServiceWorkerId::new();
        let inside = clients.add(url("https://app.example/index.html"), ClientType::Window);
        clients.add(url("https://other.example/"), ClientType::Window);

        let claimed = clients.claim(worker, &url("https://app.example/"));
        assert_eq!(claimed, vec![inside]);

        // Already controlled clients are not reported twice.
        assert!(clients.claim(worker, &url("https://app.example/")).is_empty());
    }
}
