use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{BoardMarker, CommentMarker, NotificationMarker, UserMarker};
use crate::types::Id;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Notification {
  #[serde(rename = "_id")]
  pub id: Id<NotificationMarker>,
  /// Recipient of the notification.
  pub owner_id: Id<UserMarker>,
  /// Display name of whoever triggered it.
  pub actor_name: String,
  pub kind: NotificationKind,
  pub board_id: Id<BoardMarker>,
  pub comment_id: Option<Id<CommentMarker>>,
  pub message: String,
  pub read: bool,
  pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  /// Someone commented on the recipient's board.
  Comment,
  /// Someone voted on the recipient's comment. At most one rating
  /// notification per (comment, recipient) pair is kept.
  Rating,
}
