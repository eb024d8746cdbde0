use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{BoardMarker, CommentMarker, UserMarker};
use crate::types::Id;

/// A threaded reply in the `comments` collection.
///
/// `upvotes`/`downvotes` are recomputed from `votes` inside the same
/// write that changes the list, so they never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
  #[serde(rename = "_id")]
  pub id: Id<CommentMarker>,
  pub board_id: Id<BoardMarker>,
  pub parent_id: Option<Id<CommentMarker>>,
  pub author_id: Id<UserMarker>,
  pub username: String,
  pub content: String,
  #[serde(default)]
  pub votes: Vec<CommentVote>,
  pub upvotes: u32,
  pub downvotes: u32,
  pub destroyed: bool,
  pub created_at: DateTime,
  pub updated_at: Option<DateTime>,
}

/// One user's current vote. A user appears at most once in
/// [`Comment::votes`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentVote {
  pub user_id: Id<UserMarker>,
  pub direction: VoteDirection,
  pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  /// The serialized name, as stored in vote documents.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Up => "up",
      Self::Down => "down",
    }
  }
}
