use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::extras::validate_url;
use validator::{HasLength, ValidateError};

use crate::schema::{Board, BoardVideo, BoardView};

pub mod create;
pub mod moderate;
pub mod update;

/// Board shape every public endpoint responds with. Identifiers are
/// plain hex strings on the wire and timestamps are RFC 3339.
#[derive(Debug, Deserialize, Serialize)]
pub struct BoardData {
  pub id: String,
  pub author_id: String,
  pub title: String,
  pub description: String,
  pub language: String,
  pub content: String,
  pub images: Vec<String>,
  pub video: Option<BoardVideo>,
  pub hashtags: Vec<String>,
  pub likes: Vec<String>,
  pub likes_count: u64,
  pub shared_with: Vec<String>,
  pub is_pending: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl From<Board> for BoardData {
  fn from(board: Board) -> Self {
    Self {
      id: board.id.to_hex(),
      author_id: board.author_id.to_hex(),
      title: board.title,
      description: board.description,
      language: board.language,
      content: board.content,
      images: board.images,
      video: board.video,
      hashtags: board.hashtags,
      likes_count: board.likes.len() as u64,
      likes: board.likes.iter().map(|id| id.to_hex()).collect(),
      shared_with: board.shared_with.iter().map(|id| id.to_hex()).collect(),
      is_pending: board.is_pending,
      created_at: board.created_at.to_chrono(),
      updated_at: board.updated_at.map(|at| at.to_chrono()),
    }
  }
}

/// Detail view with the read-time comment counter attached.
#[derive(Debug, Deserialize, Serialize)]
pub struct BoardDetail {
  #[serde(flatten)]
  pub board: BoardData,
  pub comments_count: u64,
}

impl From<BoardView> for BoardDetail {
  fn from(view: BoardView) -> Self {
    Self {
      comments_count: view.comments_count,
      board: view.board.into(),
    }
  }
}

/// Entry in a shared or saved listing. Boards that were deleted (or
/// hidden) since being recorded leave a tombstone so clients can
/// prune the stale reference.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BoardEntry {
  Live(Box<BoardDetail>),
  Gone { id: String, deleted: bool },
}

impl BoardEntry {
  #[must_use]
  pub fn gone(id: String) -> Self {
    Self::Gone { id, deleted: true }
  }
}

pub(super) fn required_text(value: &str, max: usize) -> ValidateError {
  let mut error = ValidateError::msg_builder();
  if value.trim().is_empty() {
    error.insert("This field is required");
  } else if value.length() > max {
    error.insert(format!("Must be {max} characters or fewer"));
  }
  error.build()
}

pub(super) fn image_errors(images: &[String]) -> ValidateError {
  let mut slice = ValidateError::slice_builder();
  for image in images {
    slice.insert(if validate_url(image) {
      None
    } else {
      let mut error = ValidateError::msg_builder();
      error.insert("Must be a valid URL");
      Some(error.build())
    });
  }
  slice.build()
}

pub(super) fn video_errors(video: &BoardVideo) -> ValidateError {
  let mut error = ValidateError::msg_builder();
  if !validate_url(&video.url) {
    error.insert("Video URL must be a valid URL");
  }
  error.build()
}
