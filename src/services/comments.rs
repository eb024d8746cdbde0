use thiserror::Error;
use validator::Validate;

use crate::http::{Error, Result};
use crate::schema::{Comment, NotificationKind, User, VoteDirection};
use crate::store::{CommentPatch, NewComment, NewNotification, ReadOptions};
use crate::types::form::comments::{create, update};
use crate::types::id::marker::{BoardMarker, CommentMarker};
use crate::types::{Error as ErrorType, Id, Page, PageRequest};
use crate::App;

use super::{field_error, parse_id};

#[derive(Debug, Error)]
#[error("Comment not found")]
struct CommentNotFound;

fn comment_not_found() -> Error {
  Error::from_context(ErrorType::not_found("Comment not found"), CommentNotFound)
}

#[derive(Debug, Error)]
#[error("Attempt to modify somebody else's comment")]
struct NotYourComment;

/// Stores and pushes a notification. Failures are logged and
/// dropped; the write that triggered the notification has already
/// succeeded and must stay successful.
async fn notify(app: &App, input: NewNotification) {
  match app.store.notifications.insert(input).await {
    Ok(notification) => app.notifier.deliver(&notification).await,
    Err(report) => tracing::warn!(error = ?report, "could not store a notification"),
  }
}

#[derive(Debug)]
pub struct CreateComment {
  pub form: create::Request,
}

impl CreateComment {
  #[tracing::instrument(skip_all, name = "services.comments.create")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Comment> {
    #[derive(Debug, Error)]
    #[error("Board not found")]
    struct BoardNotFound;

    self.form.validate()?;
    let board_id = parse_id::<BoardMarker>("board_id", &self.form.board_id)?;

    // Pending boards accept comments too; existence is the only gate.
    let board = app
      .store
      .boards
      .find_by_id(board_id, ReadOptions::moderation_inclusive())
      .await?
      .ok_or_else(|| {
        Error::from_context(ErrorType::not_found("Board not found"), BoardNotFound)
      })?;

    let parent_id = match self.form.parent_id.as_deref() {
      Some(raw) => {
        let parent_id = parse_id::<CommentMarker>("parent_id", raw)?;
        let parent = app
          .store
          .comments
          .find_by_id(parent_id)
          .await?
          .ok_or_else(|| {
            Error::from(field_error("parent_id", "Parent comment does not exist"))
          })?;
        if parent.board_id != board_id {
          return Err(field_error("parent_id", "Parent comment belongs to another board").into());
        }
        Some(parent_id)
      }
      None => None,
    };

    let username = user.visible_name().to_owned();
    let comment = app
      .store
      .comments
      .create(NewComment {
        board_id,
        parent_id,
        author_id: user.id,
        username: username.clone(),
        content: self.form.content,
      })
      .await?;

    if board.board.author_id != user.id {
      let message = format!("{username} commented on your board");
      notify(
        app,
        NewNotification {
          owner_id: board.board.author_id,
          actor_name: username,
          kind: NotificationKind::Comment,
          board_id,
          comment_id: Some(comment.id),
          message,
        },
      )
      .await;
    }
    Ok(comment)
  }
}

#[derive(Debug)]
pub struct GetComment<'a> {
  pub id: &'a str,
}

impl GetComment<'_> {
  #[tracing::instrument(skip_all, name = "services.comments.get")]
  pub async fn perform(self, app: &App) -> Result<Comment> {
    let comment = match Id::parse(self.id.trim()) {
      Some(id) => app.store.comments.find_by_id(id).await?,
      None => None,
    };
    comment.ok_or_else(comment_not_found)
  }
}

#[derive(Debug)]
pub struct ListCommentsByBoard<'a> {
  pub board_id: &'a str,
  pub page: PageRequest,
}

impl ListCommentsByBoard<'_> {
  #[tracing::instrument(skip_all, name = "services.comments.by_board")]
  pub async fn perform(self, app: &App) -> Result<Page<Comment>> {
    let Some(board_id) = Id::parse(self.board_id.trim()) else {
      return Ok(Page::empty());
    };
    Ok(app.store.comments.list_by_board(board_id, self.page).await?)
  }
}

#[derive(Debug)]
pub struct VoteComment<'a> {
  pub id: &'a str,
  pub direction: VoteDirection,
}

impl VoteComment<'_> {
  /// Voting the held direction again retracts it, the opposite one
  /// flips it. Casting and flipping notify the comment's author;
  /// retracting stays silent, and so does voting on yourself.
  #[tracing::instrument(skip_all, name = "services.comments.vote")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Comment> {
    let id = parse_id::<CommentMarker>("id", self.id)?;

    let comment = app
      .store
      .comments
      .vote(id, user.id, self.direction)
      .await?
      .ok_or_else(comment_not_found)?;

    let vote_stands = comment.votes.iter().any(|vote| vote.user_id == user.id);
    if vote_stands && comment.author_id != user.id {
      let verb = match self.direction {
        VoteDirection::Up => "upvoted",
        VoteDirection::Down => "downvoted",
      };
      let actor_name = user.visible_name().to_owned();
      let message = format!("{actor_name} {verb} your comment");
      notify(
        app,
        NewNotification {
          owner_id: comment.author_id,
          actor_name,
          kind: NotificationKind::Rating,
          board_id: comment.board_id,
          comment_id: Some(comment.id),
          message,
        },
      )
      .await;
    }
    Ok(comment)
  }
}

#[derive(Debug)]
pub struct UpdateComment<'a> {
  pub id: &'a str,
  pub form: update::Request,
}

impl UpdateComment<'_> {
  /// Comments are only ever edited by whoever wrote them; admins
  /// moderate by deleting, not by rewording.
  #[tracing::instrument(skip_all, name = "services.comments.update")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Comment> {
    self.form.validate()?;
    let id = parse_id::<CommentMarker>("id", self.id)?;

    let current = app
      .store
      .comments
      .find_by_id(id)
      .await?
      .ok_or_else(comment_not_found)?;
    if current.author_id != user.id {
      return Err(Error::from_context(ErrorType::Forbidden, NotYourComment));
    }

    app
      .store
      .comments
      .update(
        id,
        CommentPatch {
          content: Some(self.form.content),
        },
      )
      .await?
      .ok_or_else(comment_not_found)
  }
}

#[derive(Debug)]
pub struct DeleteComment<'a> {
  pub id: &'a str,
}

impl DeleteComment<'_> {
  #[tracing::instrument(skip_all, name = "services.comments.delete")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    let id = parse_id::<CommentMarker>("id", self.id)?;

    let current = app
      .store
      .comments
      .find_by_id(id)
      .await?
      .ok_or_else(|| Error::from(field_error("id", "Nothing to delete")))?;
    if current.author_id != user.id && !user.admin {
      return Err(Error::from_context(ErrorType::Forbidden, NotYourComment));
    }

    if !app.store.comments.delete(id).await? {
      return Err(field_error("id", "Nothing to delete").into());
    }
    Ok(())
  }
}
