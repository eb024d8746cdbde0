use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use validator::{Validate, ValidateError};

use super::ParseError;
use crate::util::{figment::FigmentErrorAttachable, validator::IntoValidatorReport};

#[derive(Debug, Deserialize)]
pub struct Server {
  /// **Environment variables**:
  /// - `SNIPBOARD_ADDRESS`
  #[serde(default = "Server::default_address")]
  pub address: IpAddr,
  /// **Environment variables**:
  /// - `SNIPBOARD_PORT`
  #[serde(default = "Server::default_port")]
  pub port: u16,
  /// Actix worker count; the actix default (one per core) when unset.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_WORKERS`
  #[serde(default)]
  pub workers: Option<NonZeroUsize>,
  pub db: super::Database,
  pub auth: super::Auth,
  #[serde(default)]
  pub boards: super::Boards,
}

impl Server {
  pub fn load() -> Result<Self, ParseError> {
    dotenvy::dotenv().ok();

    let config = Self::figment()
      .extract::<Self>()
      .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

    config
      .validate()
      .into_validator_report()
      .change_context(ParseError)?;

    Ok(config)
  }
}

impl Server {
  const DEFAULT_CONFIG_FILE: &str = "snipboard.yml";

  const fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
  }

  const fn default_port() -> u16 {
    8080
  }

  /// Creates a default [`figment::Figment`] object to load server
  /// configuration. This function is there for implementing
  /// [`Server::load`] and testing.
  pub(crate) fn figment() -> figment::Figment {
    use figment::{
      providers::{Env, Format, Yaml},
      Figment,
    };

    Figment::new()
      .merge(Yaml::file(Self::DEFAULT_CONFIG_FILE))
      // One big con about figment (env provider to be specific) especially
      // these fields with underscore in it.
      .merge(Env::prefixed("SNIPBOARD_").map(|v| match v.as_str() {
        "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
        "DB_POOL_SIZE" => "db.pool_size".into(),

        "AUTH_JWT_SECRET" => "auth.jwt_secret".into(),
        "AUTH_ACCESS_TOKEN_SECS" => "auth.access_token_secs".into(),
        "AUTH_SESSION_DAYS" => "auth.session_days".into(),

        "BOARDS_CASCADE_COMMENTS_ON_DELETE" => "boards.cascade_comments_on_delete".into(),

        _ => v.as_str().replace('_', ".").into(),
      }))
      // Environment variable aliases
      .merge(Env::raw().map(|v| match v.as_str() {
        "MONGODB_URI" => "db.url".into(),
        "DATABASE_NAME" => "db.database".into(),
        _ => v.into(),
      }))
  }
}

impl Validate for Server {
  fn validate(&self) -> std::result::Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    if let Err(error) = self.db.validate() {
      fields.insert("db", error);
    }
    if let Err(error) = self.auth.validate() {
      fields.insert("auth", error);
    }
    fields.build().into_result()
  }
}

#[cfg(test)]
impl Server {
  /// Fixed configuration for service tests; nothing in it reaches a
  /// real network.
  pub(crate) fn for_tests() -> Self {
    use crate::util::Sensitive;
    use std::num::{NonZeroU32, NonZeroU64};

    Self {
      address: Self::default_address(),
      port: Self::default_port(),
      workers: None,
      db: super::Database {
        url: Sensitive::new("mongodb://localhost:27017".into()),
        database: "snipboard_tests".into(),
        timeout_secs: NonZeroU64::new(5).unwrap(),
        pool_size: Some(NonZeroU32::new(2).unwrap()),
      },
      auth: super::Auth {
        jwt_secret: Sensitive::new("snipboard-tests-signing-key".into()),
        access_token_secs: NonZeroU64::new(900).unwrap(),
        session_days: NonZeroU64::new(365).unwrap(),
      },
      boards: super::Boards::default(),
    }
  }
}
