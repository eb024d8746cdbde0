use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{schema::User, App};

use super::{Error, Jwt};

/// Caller identity resolved from the `Authorization` header.
#[derive(Debug)]
pub enum Actor {
  Anonymous,
  User(User),
}

impl Actor {
  pub fn get_user(self) -> Result<User, Error> {
    #[derive(Debug, Error)]
    #[error("Attempt to access user-only route")]
    struct Unauthorized;
    match self {
      Self::User(n) => Ok(n),
      Self::Anonymous => Err(Error::from_context(
        crate::types::Error::Unauthorized,
        Unauthorized,
      )),
    }
  }

  /// Whether the caller may see moderation-hidden content.
  #[must_use]
  pub fn is_admin(&self) -> bool {
    matches!(self, Self::User(user) if user.admin)
  }
}

impl FromRequest for Actor {
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(
    req: &actix_web::HttpRequest,
    _payload: &mut actix_web::dev::Payload,
  ) -> Self::Future {
    let token = req
      .headers()
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
      return Box::pin(ready(Ok(Actor::Anonymous)));
    };

    let Some(app) = req.app_data::<web::Data<App>>() else {
      #[derive(Debug, Error)]
      #[error("The web app has no available configuration")]
      struct NoConfig;
      return Box::pin(ready(Err(Error::from_context(
        crate::types::Error::Internal,
        NoConfig,
      ))));
    };

    let app = app.clone();
    let token = token.to_owned();
    Box::pin(async move {
      let claims = Jwt::decode(&token, &app)?;
      // Tokens outlive accounts; one whose user is gone degrades to
      // an anonymous caller instead of a dangling identity.
      match app.store.users.find_by_id(claims.user_id).await? {
        Some(user) => Ok(Actor::User(user)),
        None => Ok(Actor::Anonymous),
      }
    })
  }
}
