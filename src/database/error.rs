use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// The configured MongoDB connection string could not be parsed
  /// or resolved.
  #[error("invalid connection url")]
  InvalidUrl,
  /// An error caused by a [`mongodb`] driver error.
  #[error("received a driver error: {0}")]
  Internal(mongodb::error::Error),
  /// A write collided with a unique index (server code 11000).
  #[error("document violates a unique index")]
  Duplicate,
  /// The server cannot be reached or selected right now.
  #[error("unhealthy database connection")]
  Unhealthy,
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Server error code raised on unique index violations.
const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
  use mongodb::error::{ErrorKind, WriteFailure};
  match error.kind.as_ref() {
    ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
    ErrorKind::BulkWrite(bulk) => bulk
      .write_errors
      .as_ref()
      .map(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE))
      .unwrap_or_default(),
    ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
    _ => false,
  }
}

fn is_connectivity(error: &mongodb::error::Error) -> bool {
  use mongodb::error::ErrorKind;
  matches!(
    error.kind.as_ref(),
    ErrorKind::ServerSelection { .. }
      | ErrorKind::Io(..)
      | ErrorKind::ConnectionPoolCleared { .. }
  )
}

/// Converts from a generic [mongodb] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, mongodb::error::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| {
      if is_duplicate_key(&e) {
        Report::new(e).change_context(Error::Duplicate)
      } else if is_connectivity(&e) {
        Report::new(e).change_context(Error::Unhealthy)
      } else {
        Report::new(Error::Internal(e))
      }
    })
  }
}

/// This trait deals with `error_stack::Report<Error>` directly because
/// matching on a variant buried inside a report is annoying at every
/// call site.
pub trait ErrorExt2 {
  fn is_unhealthy(&self) -> bool;
  fn is_duplicate(&self) -> bool;
}

impl ErrorExt2 for error_stack::Report<Error> {
  fn is_unhealthy(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::Unhealthy))
      .unwrap_or_default()
  }

  fn is_duplicate(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::Duplicate))
      .unwrap_or_default()
  }
}
