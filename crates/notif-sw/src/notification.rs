//! Notifications shown by the app.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A displayed notification. Clones share the closed flag, so the producer
/// sees a close performed by the worker.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Notification tag.
    pub tag: String,

    /// Title.
    pub title: String,

    closed: Arc<AtomicBool>,
}

impl Notification {
    /// Create a new notification.
    pub fn new(tag: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            title: title.into(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Close the notification.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether the notification was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
