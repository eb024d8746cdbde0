use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Notification, NotificationKind};

#[derive(Debug, Deserialize, Serialize)]
pub struct NotificationData {
  pub id: String,
  pub actor_name: String,
  pub kind: NotificationKind,
  pub board_id: String,
  pub comment_id: Option<String>,
  pub message: String,
  pub read: bool,
  pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationData {
  fn from(notification: Notification) -> Self {
    Self {
      id: notification.id.to_hex(),
      actor_name: notification.actor_name,
      kind: notification.kind,
      board_id: notification.board_id.to_hex(),
      comment_id: notification.comment_id.map(|id| id.to_hex()),
      message: notification.message,
      read: notification.read,
      created_at: notification.created_at.to_chrono(),
    }
  }
}

/// Inbox listing, newest first, with the unread badge count.
#[derive(Debug, Deserialize, Serialize)]
pub struct ListResponse {
  pub notifications: Vec<NotificationData>,
  pub unread_count: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarkReadResponse {
  pub updated: u64,
}
