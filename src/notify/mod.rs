//! Fire-and-forget user notification dispatch.
//!
//! The payout pipeline notifies users of payout outcomes but never depends
//! on delivery: dispatcher failures are logged and dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// A user-facing notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: NotificationPriority,
}

/// Delivery priority hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Normal,
    High,
}

/// Notification delivery collaborator.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync + fmt::Debug {
    /// Deliver a notification to a user. Best-effort; the caller logs and
    /// ignores failures.
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), NotifyError>;
}

/// Error type for notification delivery.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Default dispatcher: logs the notification and succeeds.
///
/// Stands in for the push/email delivery service, which is an external
/// collaborator of this core.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationDispatcher for LogNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), NotifyError> {
        info!(
            "notify user={} type={} title={:?}",
            user_id, notification.kind, notification.title
        );
        Ok(())
    }
}

/// Recording dispatcher for tests; optionally fails every delivery.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    fail: bool,
    delivered: Arc<Mutex<Vec<(String, Notification)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every delivery, for exercising the fire-and-forget contract.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Notifications delivered so far, in order.
    pub fn delivered(&self) -> Vec<(String, Notification)> {
        self.delivered.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl NotificationDispatcher for MockNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError("mock delivery failure".to_string()));
        }
        self.delivered
            .lock()
            .expect("mock lock poisoned")
            .push((user_id.to_string(), notification));
        Ok(())
    }
}
