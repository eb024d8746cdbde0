use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use serde::Deserialize;

use super::PageQuery;
use crate::http::{Actor, Error};
use crate::services::boards as services;
use crate::types::form::boards::{create, moderate, update, BoardData, BoardDetail};
use crate::types::form::Paginated;
use crate::App;

/// `?include_pending` is only honored for admin callers.
#[derive(Debug, Deserialize)]
pub struct ModerationQuery {
  #[serde(default)]
  include_pending: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  term: String,
}

#[derive(Debug, Deserialize)]
pub struct HashtagQuery {
  #[serde(default)]
  tag: String,
}

#[tracing::instrument]
pub async fn create(
  app: web::Data<App>,
  actor: Actor,
  form: Json<create::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let board = services::CreateBoard {
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Created().json(BoardData::from(board)))
}

#[tracing::instrument]
pub async fn get(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  query: web::Query<ModerationQuery>,
) -> Result<HttpResponse, Error> {
  let view = services::GetBoard {
    id: path.as_str(),
    include_pending: query.include_pending,
  }
  .perform(&app, &actor)
  .await?;
  Ok(HttpResponse::Ok().json(BoardDetail::from(view)))
}

#[tracing::instrument]
pub async fn list(
  app: web::Data<App>,
  actor: Actor,
  page: web::Query<PageQuery>,
  query: web::Query<ModerationQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListBoards {
    page: request,
    include_pending: query.include_pending,
  }
  .perform(&app, &actor)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page.map(BoardData::from), request)))
}

#[tracing::instrument]
pub async fn search(
  app: web::Data<App>,
  actor: Actor,
  query: web::Query<SearchQuery>,
  moderation: web::Query<ModerationQuery>,
) -> Result<HttpResponse, Error> {
  let hits = services::SearchBoards {
    term: &query.term,
    include_pending: moderation.include_pending,
  }
  .perform(&app, &actor)
  .await?;
  let hits: Vec<BoardData> = hits.into_iter().map(BoardData::from).collect();
  Ok(HttpResponse::Ok().json(hits))
}

#[tracing::instrument]
pub async fn by_hashtag(
  app: web::Data<App>,
  actor: Actor,
  query: web::Query<HashtagQuery>,
  page: web::Query<PageQuery>,
  moderation: web::Query<ModerationQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListBoardsByHashtag {
    tag: &query.tag,
    page: request,
    include_pending: moderation.include_pending,
  }
  .perform(&app, &actor)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page.map(BoardData::from), request)))
}

#[tracing::instrument]
pub async fn by_author(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  page: web::Query<PageQuery>,
  moderation: web::Query<ModerationQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListBoardsByAuthor {
    author_id: path.as_str(),
    page: request,
    include_pending: moderation.include_pending,
  }
  .perform(&app, &actor)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page.map(BoardData::from), request)))
}

#[tracing::instrument]
pub async fn update(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  form: Json<update::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let board = services::UpdateBoard {
    id: path.as_str(),
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Ok().json(BoardData::from(board)))
}

#[tracing::instrument]
pub async fn delete(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::DeleteBoard { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument]
pub async fn like(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let board = services::ToggleBoardLike { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::Ok().json(BoardData::from(board)))
}

#[tracing::instrument]
pub async fn share(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::ShareBoard { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument]
pub async fn save(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::SaveBoard { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument]
pub async fn unsave(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::UnsaveBoard { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument]
pub async fn approve(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let board = services::ApproveBoard { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::Ok().json(BoardData::from(board)))
}

#[tracing::instrument]
pub async fn set_pending(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  form: Json<moderate::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let board = services::SetBoardPending {
    id: path.as_str(),
    is_pending: form.is_pending,
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Ok().json(BoardData::from(board)))
}
