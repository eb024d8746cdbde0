use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::notify::{LogNotifier, Notifier};
use crate::store::Store;
use crate::{config, database};

/// Shared application state, cloned into every actix worker.
#[derive(Clone)]
pub struct App {
  pub config: Arc<config::Server>,
  pub store: Store,
  pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
  #[tracing::instrument(skip(cfg))]
  pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
    let db = database::Database::connect(&cfg.db)
      .await
      .change_context(AppError)?;

    let store = Store::mongo(&db).await.change_context(AppError)?;

    Ok(Self {
      config: Arc::new(cfg),
      store,
      notifier: Arc::new(LogNotifier),
    })
  }

  /// In-memory stand-in for service tests; never touches a network.
  #[cfg(test)]
  pub(crate) fn test() -> Self {
    Self {
      config: Arc::new(config::Server::for_tests()),
      store: Store::memory(),
      notifier: Arc::new(LogNotifier),
    }
  }
}

impl std::fmt::Debug for App {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("App")
      .field("config", &self.config)
      .field("store", &self.store)
      .finish_non_exhaustive()
  }
}
