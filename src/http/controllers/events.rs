use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use serde::Deserialize;

use super::PageQuery;
use crate::http::{Actor, Error};
use crate::services::events as services;
use crate::types::form::events::{create, update, EventData};
use crate::types::form::Paginated;
use crate::App;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  term: String,
}

#[tracing::instrument]
pub async fn create(
  app: web::Data<App>,
  actor: Actor,
  form: Json<create::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let event = services::CreateEvent {
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Created().json(EventData::from(event)))
}

#[tracing::instrument]
pub async fn get(app: web::Data<App>, path: web::Path<String>) -> Result<HttpResponse, Error> {
  let view = services::GetEvent { id: path.as_str() }.perform(&app).await?;
  Ok(HttpResponse::Ok().json(EventData::from(view)))
}

#[tracing::instrument]
pub async fn list(
  app: web::Data<App>,
  page: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListEvents { page: request }.perform(&app).await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page.map(EventData::from), request)))
}

#[tracing::instrument]
pub async fn search(
  app: web::Data<App>,
  query: web::Query<SearchQuery>,
) -> Result<HttpResponse, Error> {
  let hits = services::SearchEvents { term: &query.term }.perform(&app).await?;
  let hits: Vec<EventData> = hits.into_iter().map(EventData::from).collect();
  Ok(HttpResponse::Ok().json(hits))
}

#[tracing::instrument]
pub async fn update(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
  form: Json<update::Request>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let event = services::UpdateEvent {
    id: path.as_str(),
    form: form.into_inner(),
  }
  .perform(&app, &user)
  .await?;
  Ok(HttpResponse::Ok().json(EventData::from(event)))
}

#[tracing::instrument]
pub async fn delete(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  services::DeleteEvent { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument]
pub async fn join(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let event = services::JoinEvent { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::Ok().json(EventData::from(event)))
}

#[tracing::instrument]
pub async fn leave(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let event = services::LeaveEvent { id: path.as_str() }
    .perform(&app, &user)
    .await?;
  Ok(HttpResponse::Ok().json(EventData::from(event)))
}
