use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{BoardMarker, UserMarker};
use crate::types::Id;

/// One posted snippet, as stored in the `boards` collection.
///
/// `hashtags` is always derived from `content` on the write path and
/// `likes`/`shared_with` have set semantics. `updated_at` stays unset
/// until the first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Board {
  #[serde(rename = "_id")]
  pub id: Id<BoardMarker>,
  pub author_id: Id<UserMarker>,
  pub title: String,
  pub description: String,
  pub language: String,
  pub content: String,
  #[serde(default)]
  pub images: Vec<String>,
  pub video: Option<BoardVideo>,
  #[serde(default)]
  pub hashtags: Vec<String>,
  #[serde(default)]
  pub likes: Vec<Id<UserMarker>>,
  #[serde(default)]
  pub shared_with: Vec<Id<UserMarker>>,
  pub is_pending: bool,
  pub destroyed: bool,
  pub created_at: DateTime,
  pub updated_at: Option<DateTime>,
}

/// `media_id` is kept so the media collaborator can delete the old
/// upload when the video is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardVideo {
  pub url: String,
  pub media_id: Option<String>,
}

/// A board read back with its derived counters. The counters are
/// computed at read time and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardView {
  #[serde(flatten)]
  pub board: Board,
  pub comments_count: u64,
  pub likes_count: u64,
}
