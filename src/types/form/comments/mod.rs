use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Comment, CommentVote, VoteDirection};

pub mod create;
pub mod update;
pub mod vote;

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentData {
  pub id: String,
  pub board_id: String,
  pub parent_id: Option<String>,
  pub author_id: String,
  pub username: String,
  pub content: String,
  pub votes: Vec<VoteData>,
  pub upvotes: u32,
  pub downvotes: u32,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl From<Comment> for CommentData {
  fn from(comment: Comment) -> Self {
    Self {
      id: comment.id.to_hex(),
      board_id: comment.board_id.to_hex(),
      parent_id: comment.parent_id.map(|id| id.to_hex()),
      author_id: comment.author_id.to_hex(),
      username: comment.username,
      content: comment.content,
      votes: comment.votes.into_iter().map(VoteData::from).collect(),
      upvotes: comment.upvotes,
      downvotes: comment.downvotes,
      created_at: comment.created_at.to_chrono(),
      updated_at: comment.updated_at.map(|at| at.to_chrono()),
    }
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VoteData {
  pub user_id: String,
  pub direction: VoteDirection,
}

impl From<CommentVote> for VoteData {
  fn from(vote: CommentVote) -> Self {
    Self {
      user_id: vote.user_id.to_hex(),
      direction: vote.direction,
    }
  }
}
