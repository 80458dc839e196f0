//! Notification sinks
//!
//! Sinks are fire-and-forget: `notify` never blocks and never reports
//! failure back to the caller.

use shared::models::{Notification, NotificationKind};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity (notifications are sparse, a lagging
/// subscriber only loses the oldest ones)
const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

/// Consumer of operator notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.kind {
            NotificationKind::Info | NotificationKind::Success => {
                tracing::info!(kind = %n.kind, description = %description, "{}", n.title)
            }
            NotificationKind::Warning => {
                tracing::warn!(kind = %n.kind, description = %description, "{}", n.title)
            }
            NotificationKind::Error => {
                tracing::error!(kind = %n.kind, description = %description, "{}", n.title)
            }
        }
    }
}

/// Publishes notifications to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        // No subscribers is fine
        let _ = self.tx.send(notification);
    }
}

/// Forwards every notification to each inner sink
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for FanoutSink {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}
