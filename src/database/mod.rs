use error_stack::{Report, ResultExt};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::time::Duration;

use crate::config;

mod error;
pub use error::*;

/// Handle to the configured MongoDB database.
///
/// The driver connects lazily on first use, so [`Database::connect`]
/// finishes with a ping to fail fast when the server is unreachable.
#[derive(Clone)]
pub struct Database {
  database: mongodb::Database,
}

impl Database {
  pub(crate) async fn connect(cfg: &config::Database) -> Result<Self> {
    let mut options = ClientOptions::parse(cfg.url.as_str())
      .await
      .change_context(Error::InvalidUrl)?;

    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.server_selection_timeout = Some(Duration::from_secs(cfg.timeout_secs.get()));
    if let Some(pool_size) = cfg.pool_size {
      options.max_pool_size = Some(pool_size.get());
    }

    let client = Client::with_options(options).into_db_error()?;
    let this = Self {
      database: client.database(&cfg.database),
    };

    this.ping().await?;
    Ok(this)
  }
}

impl Database {
  #[inline(always)]
  pub fn collection<T>(&self, name: &str) -> mongodb::Collection<T> {
    self.database.collection(name)
  }

  #[inline(always)]
  pub fn name(&self) -> &str {
    self.database.name()
  }

  #[tracing::instrument(name = "db.ping", skip(self))]
  pub async fn ping(&self) -> Result<()> {
    self
      .database
      .run_command(doc! { "ping": 1 }, None)
      .await
      .map(|_| ())
      .map_err(|e| Report::new(e).change_context(Error::Unhealthy))
  }
}

impl std::fmt::Debug for Database {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Database")
      .field("name", &self.database.name())
      .finish()
  }
}
