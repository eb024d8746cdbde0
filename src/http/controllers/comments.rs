use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use super::PageQuery;
use crate::http::{Actor, Error};
use crate::services::comments as services;
use crate::types::form::comments::{create, update, vote, CommentData};
use crate::types::form::Paginated;
use crate::App;

#[tracing::instrument]
pub async fn create(
  app: web::Data<App>,
  actor: Actor,
  form: Json<create::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let comment = services::CreateComment {
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Created().json(CommentData::from(comment)))
}

#[tracing::instrument]
pub async fn get(app: web::Data<App>, path: web::Path<String>) -> Result<HttpResponse, Error> {
  let comment = services::GetComment { id: path.as_str() }.perform(&app).await?;
  Ok(HttpResponse::Ok().json(CommentData::from(comment)))
}

#[tracing::instrument]
pub async fn by_board(
  app: web::Data<App>,
  path: web::Path<String>,
  page: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListCommentsByBoard {
    board_id: path.as_str(),
    page: request,
  }
  .perform(&app)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page.map(CommentData::from), request)))
}

#[tracing::instrument]
pub async fn vote(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  form: Json<vote::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let comment = services::VoteComment {
    id: path.as_str(),
    direction: form.direction,
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Ok().json(CommentData::from(comment)))
}

#[tracing::instrument]
pub async fn update(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  form: Json<update::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let comment = services::UpdateComment {
    id: path.as_str(),
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Ok().json(CommentData::from(comment)))
}

#[tracing::instrument]
pub async fn delete(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::DeleteComment { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}
