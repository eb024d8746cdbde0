use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};
use validator::{Validate, ValidateError};

use crate::util::Sensitive;

/// Connection settings for the MongoDB deployment.
#[derive(Debug, Deserialize)]
pub struct Database {
  /// Connection string, `mongodb://` or `mongodb+srv://`.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_DB_URL` or `MONGODB_URI`
  pub url: Sensitive<String>,
  /// Name of the database holding every collection.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_DB_DATABASE` or `DATABASE_NAME`
  pub database: String,
  /// How long server selection may take before a connection attempt
  /// is reported as unhealthy.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_DB_TIMEOUT_SECS`
  #[serde(default = "Database::default_timeout_secs")]
  pub timeout_secs: NonZeroU64,
  /// Upper bound on the driver's connection pool. Left to the driver
  /// default when unset.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_DB_POOL_SIZE`
  #[serde(default)]
  pub pool_size: Option<NonZeroU32>,
}

impl Database {
  const DEFAULT_TIMEOUT_SECS: u64 = 5;

  // Required by serde
  const fn default_timeout_secs() -> NonZeroU64 {
    match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
      Some(n) => n,
      None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
    }
  }
}

impl Validate for Database {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("url", {
      let mut error = ValidateError::msg_builder();
      if !validator::extras::validate_url(self.url.as_str()) {
        error.insert("Invalid MongoDB connection URL");
      }
      error.build()
    });
    fields.insert("database", {
      let mut error = ValidateError::msg_builder();
      if self.database.trim().is_empty() {
        error.insert("Database name is required");
      }
      error.build()
    });
    fields.build().into_result()
  }
}
