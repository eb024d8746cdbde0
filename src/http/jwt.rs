use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Error;
use crate::schema::User;
use crate::types::id::{marker::UserMarker, Id};
use crate::{types, App};

const ISSUER: &str = "snipboard";

/// Access token claims. Short-lived by configuration; anything
/// long-lived goes through the refresh session instead.
#[derive(Debug, Deserialize, Serialize)]
pub struct Jwt {
  pub iss: String,
  pub iat: i64,
  pub exp: i64,
  pub user_id: Id<UserMarker>,
  pub admin: bool,
}

impl Jwt {
  #[must_use]
  pub fn issue(user: &User, auth: &crate::config::Auth) -> Self {
    let now = Utc::now().timestamp();
    let lifetime = i64::try_from(auth.access_token_secs.get()).unwrap_or(i64::MAX);
    Self {
      iss: ISSUER.into(),
      iat: now,
      exp: now.saturating_add(lifetime),
      user_id: user.id,
      admin: user.admin,
    }
  }

  /// Signs the claims on a blocking task.
  #[tracing::instrument(skip_all)]
  pub async fn encode(self, app: &App) -> Result<String, Error> {
    let secret = app.config.auth.jwt_secret.clone();
    tokio::task::spawn_blocking(move || {
      let header = Header::new(Algorithm::HS512);
      let key = EncodingKey::from_secret(secret.as_str().as_bytes());
      jsonwebtoken::encode(&header, &self, &key)
    })
    .await
    .map_err(|error| Error::from_context(types::Error::Internal, error))?
    .map_err(|error| Error::from_context(types::Error::Internal, error))
  }

  /// Expired, tampered and foreign-issuer tokens all come back as
  /// [`types::Error::Unauthorized`].
  #[tracing::instrument(skip_all)]
  pub fn decode(token: &str, app: &App) -> Result<Self, Error> {
    let key = DecodingKey::from_secret(app.config.auth.jwt_secret.as_str().as_bytes());
    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[ISSUER]);

    match jsonwebtoken::decode::<Self>(token, &key, &validation) {
      Ok(data) => Ok(data.claims),
      Err(error) => Err(Error::from_context(types::Error::Unauthorized, error)),
    }
  }
}
