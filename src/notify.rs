use async_trait::async_trait;

use crate::schema::Notification;

/// Real-time delivery hook for freshly stored notifications.
///
/// Delivery is best effort. Implementations must swallow their own
/// failures; a notification that cannot be pushed must never fail
/// the board or comment operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn deliver(&self, notification: &Notification);
}

/// Default transport that only writes the delivery to the log.
/// Stands in until a socket transport is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
  async fn deliver(&self, notification: &Notification) {
    tracing::info!(
      owner = %notification.owner_id,
      kind = ?notification.kind,
      "delivering notification",
    );
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use std::sync::Mutex;

  use super::{async_trait, Notification, Notifier};

  /// Captures every delivery so tests can assert on the push side.
  #[derive(Debug, Default)]
  pub(crate) struct RecordingNotifier {
    pub delivered: Mutex<Vec<Notification>>,
  }

  #[async_trait]
  impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) {
      self.delivered.lock().unwrap().push(notification.clone());
    }
  }
}
