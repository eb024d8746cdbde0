use thiserror::Error;
use validator::Validate;

use crate::http::{Actor, Error, Result};
use crate::schema::{Board, BoardView, User};
use crate::store::{BoardPatch, NewBoard, ReadOptions};
use crate::types::form::boards::{create, update};
use crate::types::id::marker::BoardMarker;
use crate::types::{Error as ErrorType, Id, Page, PageRequest};
use crate::App;

use super::{field_error, parse_id, read_options, require_admin};

#[derive(Debug, Error)]
#[error("Board not found")]
struct BoardNotFound;

fn board_not_found() -> Error {
  Error::from_context(ErrorType::not_found("Board not found"), BoardNotFound)
}

/// Only the author or an admin may touch an existing board.
fn authorize_owner(board: &Board, user: &User) -> Result<()> {
  #[derive(Debug, Error)]
  #[error("Attempt to modify somebody else's board")]
  struct NotYourBoard;
  if board.author_id == user.id || user.admin {
    Ok(())
  } else {
    Err(Error::from_context(ErrorType::Forbidden, NotYourBoard))
  }
}

#[derive(Debug)]
pub struct CreateBoard {
  pub form: create::Request,
}

impl CreateBoard {
  #[tracing::instrument(skip_all, name = "services.boards.create")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Board> {
    self.form.validate()?;

    let board = app
      .store
      .boards
      .create(NewBoard {
        author_id: user.id,
        title: self.form.title,
        description: self.form.description,
        language: self.form.language,
        content: self.form.content,
        images: self.form.images,
        video: self.form.video,
      })
      .await?;

    Ok(board)
  }
}

#[derive(Debug)]
pub struct GetBoard<'a> {
  pub id: &'a str,
  pub include_pending: bool,
}

impl GetBoard<'_> {
  /// Missing, hard-deleted and moderation-hidden boards are all the
  /// same "not found" so existence of hidden content never leaks.
  #[tracing::instrument(skip_all, name = "services.boards.get")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<BoardView> {
    let opts = read_options(actor, self.include_pending);
    let board = match Id::parse(self.id.trim()) {
      Some(id) => app.store.boards.find_by_id(id, opts).await?,
      None => None,
    };
    board.ok_or_else(board_not_found)
  }
}

#[derive(Debug)]
pub struct ListBoards {
  pub page: PageRequest,
  pub include_pending: bool,
}

impl ListBoards {
  #[tracing::instrument(skip_all, name = "services.boards.list")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<Page<Board>> {
    let opts = read_options(actor, self.include_pending);
    Ok(app.store.boards.list_page(self.page, opts).await?)
  }
}

#[derive(Debug)]
pub struct SearchBoards<'a> {
  pub term: &'a str,
  pub include_pending: bool,
}

impl SearchBoards<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.search")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<Vec<Board>> {
    let opts = read_options(actor, self.include_pending);
    Ok(app.store.boards.search(self.term, opts).await?)
  }
}

#[derive(Debug)]
pub struct ListBoardsByHashtag<'a> {
  pub tag: &'a str,
  pub page: PageRequest,
  pub include_pending: bool,
}

impl ListBoardsByHashtag<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.by_hashtag")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<Page<Board>> {
    let opts = read_options(actor, self.include_pending);
    Ok(
      app
        .store
        .boards
        .list_by_hashtag(self.tag, self.page, opts)
        .await?,
    )
  }
}

#[derive(Debug)]
pub struct ListBoardsByAuthor<'a> {
  pub author_id: &'a str,
  pub page: PageRequest,
  pub include_pending: bool,
}

impl ListBoardsByAuthor<'_> {
  /// Callers pass route params straight through here, so a malformed
  /// author id is an empty page rather than an error.
  #[tracing::instrument(skip_all, name = "services.boards.by_author")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<Page<Board>> {
    let Some(author_id) = Id::parse(self.author_id.trim()) else {
      return Ok(Page::empty());
    };
    let opts = read_options(actor, self.include_pending);
    Ok(
      app
        .store
        .boards
        .list_by_author(author_id, self.page, opts)
        .await?,
    )
  }
}

#[derive(Debug)]
pub struct UpdateBoard<'a> {
  pub id: &'a str,
  pub form: update::Request,
}

impl UpdateBoard<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.update")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Board> {
    self.form.validate()?;
    let id = parse_id::<BoardMarker>("id", self.id)?;

    let current = app
      .store
      .boards
      .find_by_id(id, ReadOptions::moderation_inclusive())
      .await?
      .ok_or_else(board_not_found)?;
    authorize_owner(&current.board, user)?;

    let patch = BoardPatch {
      title: self.form.title,
      description: self.form.description,
      language: self.form.language,
      content: self.form.content,
      images: self.form.images,
      video: self.form.video,
    };

    app
      .store
      .boards
      .update(id, patch)
      .await?
      .ok_or_else(board_not_found)
  }
}

#[derive(Debug)]
pub struct ApproveBoard<'a> {
  pub id: &'a str,
}

impl ApproveBoard<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.approve")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Board> {
    SetBoardPending {
      id: self.id,
      is_pending: false,
    }
    .perform(app, user)
    .await
  }
}

#[derive(Debug)]
pub struct SetBoardPending<'a> {
  pub id: &'a str,
  pub is_pending: bool,
}

impl SetBoardPending<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.set_pending")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Board> {
    require_admin(user)?;
    let id = parse_id::<BoardMarker>("id", self.id)?;

    app
      .store
      .boards
      .set_moderation(id, self.is_pending)
      .await?
      .ok_or_else(board_not_found)
  }
}

#[derive(Debug)]
pub struct ToggleBoardLike<'a> {
  pub id: &'a str,
}

impl ToggleBoardLike<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.like")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Board> {
    let id = parse_id::<BoardMarker>("id", self.id)?;

    app
      .store
      .boards
      .toggle_like(id, user.id)
      .await?
      .ok_or_else(board_not_found)
  }
}

#[derive(Debug)]
pub struct ShareBoard<'a> {
  pub id: &'a str,
}

impl ShareBoard<'_> {
  /// Records the share on both sides: the board's `shared_with` set
  /// and the user's `shared_posts` set.
  #[tracing::instrument(skip_all, name = "services.boards.share")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    let id = parse_id::<BoardMarker>("id", self.id)?;

    if !app.store.boards.add_share(id, user.id).await? {
      return Err(board_not_found());
    }
    app.store.users.add_shared_post(user.id, id).await?;
    Ok(())
  }
}

#[derive(Debug)]
pub struct SaveBoard<'a> {
  pub id: &'a str,
}

impl SaveBoard<'_> {
  #[tracing::instrument(skip_all, name = "services.boards.save")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    let id = parse_id::<BoardMarker>("id", self.id)?;

    // Only boards the caller can actually see can be bookmarked.
    let opts = ReadOptions {
      include_pending: user.admin,
    };
    if app.store.boards.find_by_id(id, opts).await?.is_none() {
      return Err(board_not_found());
    }
    app.store.users.add_saved_post(user.id, id).await?;
    Ok(())
  }
}

#[derive(Debug)]
pub struct UnsaveBoard<'a> {
  pub id: &'a str,
}

impl UnsaveBoard<'_> {
  /// Idempotent; unsaving something never saved is still a success.
  #[tracing::instrument(skip_all, name = "services.boards.unsave")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    let id = parse_id::<BoardMarker>("id", self.id)?;
    app.store.users.remove_saved_post(user.id, id).await?;
    Ok(())
  }
}

#[derive(Debug)]
pub struct DeleteBoard<'a> {
  pub id: &'a str,
}

impl DeleteBoard<'_> {
  /// Deleting nothing is reported as a validation failure, which
  /// keeps "nothing was deleted" distinguishable from "deleted".
  #[tracing::instrument(skip_all, name = "services.boards.delete")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    let id = parse_id::<BoardMarker>("id", self.id)?;

    let current = app
      .store
      .boards
      .find_by_id(id, ReadOptions::moderation_inclusive())
      .await?
      .ok_or_else(|| Error::from(field_error("id", "Nothing to delete")))?;
    authorize_owner(&current.board, user)?;

    if !app.store.boards.delete(id).await? {
      return Err(field_error("id", "Nothing to delete").into());
    }

    if app.config.boards.cascade_comments_on_delete {
      let removed = app.store.comments.delete_by_board(id).await?;
      tracing::info!(board = %id, removed, "cascade deleted comments");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::{board_form, seed_admin, seed_board, seed_user};
  use crate::store::NewComment;
  use crate::App;
  use std::sync::Arc;

  #[tokio::test]
  async fn created_boards_wait_for_moderation() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;

    let board = CreateBoard { form: board_form() }
      .perform(&app, &author)
      .await
      .unwrap();
    assert!(board.is_pending);
    assert_eq!(vec!["#demo"], board.hashtags);

    // Hidden from the public detail read until approved.
    let hex = board.id.to_hex();
    let error = GetBoard {
      id: &hex,
      include_pending: false,
    }
    .perform(&app, &Actor::Anonymous)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::NotFound { .. }));
  }

  #[tokio::test]
  async fn include_pending_is_admin_only() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let admin = seed_admin(&app, "moderator").await;

    let board = CreateBoard { form: board_form() }
      .perform(&app, &author)
      .await
      .unwrap();
    let hex = board.id.to_hex();

    // A non-admin asking for pending content is quietly ignored.
    let error = GetBoard {
      id: &hex,
      include_pending: true,
    }
    .perform(&app, &Actor::User(author))
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::NotFound { .. }));

    let view = GetBoard {
      id: &hex,
      include_pending: true,
    }
    .perform(&app, &Actor::User(admin))
    .await
    .unwrap();
    assert!(view.board.is_pending);
  }

  #[tokio::test]
  async fn approving_needs_an_admin() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let admin = seed_admin(&app, "moderator").await;

    let board = CreateBoard { form: board_form() }
      .perform(&app, &author)
      .await
      .unwrap();
    let hex = board.id.to_hex();

    let error = ApproveBoard { id: &hex }
      .perform(&app, &author)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Forbidden));

    let approved = ApproveBoard { id: &hex }.perform(&app, &admin).await.unwrap();
    assert!(!approved.is_pending);
  }

  #[tokio::test]
  async fn only_the_author_or_an_admin_updates() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let stranger = seed_user(&app, "someone").await;
    let board = seed_board(&app, &author).await;
    let hex = board.id.to_hex();

    let patch = update::Request {
      title: Some("Renamed".into()),
      ..Default::default()
    };
    let error = UpdateBoard {
      id: &hex,
      form: patch,
    }
    .perform(&app, &stranger)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Forbidden));

    let patch = update::Request {
      title: Some("Renamed".into()),
      content: Some("now about #tokio".into()),
      ..Default::default()
    };
    let updated = UpdateBoard {
      id: &hex,
      form: patch,
    }
    .perform(&app, &author)
    .await
    .unwrap();
    assert_eq!("Renamed", updated.title);
    assert_eq!(vec!["#tokio"], updated.hashtags);
  }

  #[tokio::test]
  async fn malformed_ids_fail_validation_on_writes() {
    let app = App::test();
    let user = seed_user(&app, "camille").await;

    let error = ToggleBoardLike { id: "not-an-id" }
      .perform(&app, &user)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::InvalidFormBody(..)));
  }

  #[tokio::test]
  async fn deleting_nothing_is_a_validation_failure() {
    let app = App::test();
    let user = seed_user(&app, "camille").await;

    let error = DeleteBoard {
      id: "507f1f77bcf86cd799439011",
    }
    .perform(&app, &user)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::InvalidFormBody(..)));
  }

  #[tokio::test]
  async fn delete_cascades_only_when_configured() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let board = seed_board(&app, &author).await;
    app
      .store
      .comments
      .create(NewComment {
        board_id: board.id,
        parent_id: None,
        author_id: author.id,
        username: author.name.clone(),
        content: "first!".into(),
      })
      .await
      .unwrap();

    let hex = board.id.to_hex();
    DeleteBoard { id: &hex }.perform(&app, &author).await.unwrap();

    // Cascade off: the orphaned comment is still stored.
    let leftovers = app
      .store
      .comments
      .list_by_board(board.id, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(1, leftovers.total_count);

    let mut app = App::test();
    Arc::get_mut(&mut app.config)
      .unwrap()
      .boards
      .cascade_comments_on_delete = true;
    let author = seed_user(&app, "camille").await;
    let board = seed_board(&app, &author).await;
    app
      .store
      .comments
      .create(NewComment {
        board_id: board.id,
        parent_id: None,
        author_id: author.id,
        username: author.name.clone(),
        content: "first!".into(),
      })
      .await
      .unwrap();

    let hex = board.id.to_hex();
    DeleteBoard { id: &hex }.perform(&app, &author).await.unwrap();

    let leftovers = app
      .store
      .comments
      .list_by_board(board.id, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(0, leftovers.total_count);
  }

  #[tokio::test]
  async fn sharing_lands_on_both_sides() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let reader = seed_user(&app, "readerly").await;
    let board = seed_board(&app, &author).await;
    let hex = board.id.to_hex();

    ShareBoard { id: &hex }.perform(&app, &reader).await.unwrap();
    ShareBoard { id: &hex }.perform(&app, &reader).await.unwrap();

    let view = GetBoard {
      id: &hex,
      include_pending: false,
    }
    .perform(&app, &Actor::Anonymous)
    .await
    .unwrap();
    assert_eq!(vec![reader.id], view.board.shared_with);

    let shared = app
      .store
      .users
      .list_shared_posts(reader.id, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(vec![board.id], shared.items);
  }

  #[tokio::test]
  async fn saving_and_unsaving_are_idempotent() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let reader = seed_user(&app, "readerly").await;
    let board = seed_board(&app, &author).await;
    let hex = board.id.to_hex();

    SaveBoard { id: &hex }.perform(&app, &reader).await.unwrap();
    SaveBoard { id: &hex }.perform(&app, &reader).await.unwrap();

    let saved = app
      .store
      .users
      .list_saved_posts(reader.id, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(1, saved.total_count);

    UnsaveBoard { id: &hex }.perform(&app, &reader).await.unwrap();
    UnsaveBoard { id: &hex }.perform(&app, &reader).await.unwrap();

    let saved = app
      .store
      .users
      .list_saved_posts(reader.id, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(0, saved.total_count);
  }

  #[tokio::test]
  async fn blank_search_is_empty_not_everything() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    seed_board(&app, &author).await;

    let hits = SearchBoards {
      term: "   ",
      include_pending: false,
    }
    .perform(&app, &Actor::Anonymous)
    .await
    .unwrap();
    assert!(hits.is_empty());

    let hits = SearchBoards {
      term: "hello",
      include_pending: false,
    }
    .perform(&app, &Actor::Anonymous)
    .await
    .unwrap();
    assert_eq!(1, hits.len());
  }

  #[tokio::test]
  async fn author_listing_tolerates_garbage_ids() {
    let app = App::test();
    let page = ListBoardsByAuthor {
      author_id: "garbage",
      page: PageRequest::default(),
      include_pending: false,
    }
    .perform(&app, &Actor::Anonymous)
    .await
    .unwrap();
    assert_eq!(0, page.total_count);
  }
}
