use crate::http::Result;
use crate::schema::{Notification, User};
use crate::App;

/// A user's inbox with the unread badge count, newest first.
#[derive(Debug)]
pub struct InboxResponse {
  pub notifications: Vec<Notification>,
  pub unread_count: u64,
}

#[derive(Debug)]
pub struct ListNotifications;

impl ListNotifications {
  /// Callers only ever see their own inbox; there is no way to ask
  /// for somebody else's.
  #[tracing::instrument(skip_all, name = "services.notifications.list")]
  pub async fn perform(self, app: &App, user: &User) -> Result<InboxResponse> {
    let notifications = app.store.notifications.list_by_owner(user.id).await?;
    let unread_count = app.store.notifications.count_unread(user.id).await?;
    Ok(InboxResponse {
      notifications,
      unread_count,
    })
  }
}

#[derive(Debug)]
pub struct MarkNotificationsRead;

impl MarkNotificationsRead {
  /// Returns how many entries actually flipped, so marking an
  /// already read inbox reports zero.
  #[tracing::instrument(skip_all, name = "services.notifications.mark_read")]
  pub async fn perform(self, app: &App, user: &User) -> Result<u64> {
    Ok(app.store.notifications.mark_all_read(user.id).await?)
  }
}
