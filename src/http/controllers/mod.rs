use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::types::page::DEFAULT_PAGE_SIZE;
use crate::types::PageRequest;

pub mod boards;
pub mod comments;
pub mod events;
pub mod notifications;
pub mod users;

/// `?page&page_size` pair shared by every listing endpoint.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
  page: Option<u32>,
  page_size: Option<u32>,
}

impl PageQuery {
  fn request(&self) -> PageRequest {
    self.request_with_size(DEFAULT_PAGE_SIZE)
  }

  fn request_with_size(&self, default_size: u32) -> PageRequest {
    PageRequest::new(
      self.page.unwrap_or(1),
      self.page_size.unwrap_or(default_size),
    )
  }
}

#[tracing::instrument]
async fn status() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/v1")
      .route("/status", web::get().to(status))
      .service(
        web::scope("/boards")
          .route("", web::post().to(boards::create))
          .route("", web::get().to(boards::list))
          .route("/search", web::get().to(boards::search))
          .route("/hashtag", web::get().to(boards::by_hashtag))
          .route("/user/{user_id}", web::get().to(boards::by_author))
          .route("/{id}", web::get().to(boards::get))
          .route("/{id}", web::put().to(boards::update))
          .route("/{id}", web::delete().to(boards::delete))
          .route("/{id}/like", web::post().to(boards::like))
          .route("/{id}/share", web::post().to(boards::share))
          .route("/{id}/save", web::post().to(boards::save))
          .route("/{id}/save", web::delete().to(boards::unsave))
          .route("/{id}/approve", web::post().to(boards::approve))
          .route("/{id}/pending", web::post().to(boards::set_pending)),
      )
      .service(
        web::scope("/comments")
          .route("", web::post().to(comments::create))
          .route("/board/{board_id}", web::get().to(comments::by_board))
          .route("/{id}", web::get().to(comments::get))
          .route("/{id}", web::put().to(comments::update))
          .route("/{id}", web::delete().to(comments::delete))
          .route("/{id}/vote", web::post().to(comments::vote)),
      )
      .service(
        web::scope("/users")
          .route("/register", web::post().to(users::register))
          .route("/login", web::post().to(users::login))
          .route("/refresh", web::post().to(users::refresh))
          .route("/logout", web::post().to(users::logout))
          .service(web::resource("/@{name}").route(web::get().to(users::profile)))
          .route("/{id}/shared", web::get().to(users::shared))
          .route("/{id}/saved", web::get().to(users::saved)),
      )
      .service(
        web::scope("/events")
          .route("", web::post().to(events::create))
          .route("", web::get().to(events::list))
          .route("/search", web::get().to(events::search))
          .route("/{id}", web::get().to(events::get))
          .route("/{id}", web::put().to(events::update))
          .route("/{id}", web::delete().to(events::delete))
          .route("/{id}/join", web::post().to(events::join))
          .route("/{id}/leave", web::post().to(events::leave)),
      )
      .service(
        web::scope("/notifications")
          .route("", web::get().to(notifications::list))
          .route("/mark-as-read", web::post().to(notifications::mark_as_read)),
      ),
  );
}
