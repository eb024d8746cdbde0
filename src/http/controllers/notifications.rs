use actix_web::{web, HttpResponse};

use crate::http::{Actor, Error};
use crate::services::notifications as services;
use crate::types::form::notifications::{ListResponse, MarkReadResponse, NotificationData};
use crate::App;

#[tracing::instrument]
pub async fn list(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let inbox = services::ListNotifications.perform(&app, &user).await?;
  Ok(HttpResponse::Ok().json(ListResponse {
    notifications: inbox
      .notifications
      .into_iter()
      .map(NotificationData::from)
      .collect(),
    unread_count: inbox.unread_count,
  }))
}

#[tracing::instrument]
pub async fn mark_as_read(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  let updated = services::MarkNotificationsRead.perform(&app, &user).await?;
  Ok(HttpResponse::Ok().json(MarkReadResponse { updated }))
}
