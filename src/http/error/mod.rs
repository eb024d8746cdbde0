use error_stack::{Context, Report};
use thiserror::Error as ThisError;
use tracing_error::SpanTrace;

use crate::types;

mod impls;

pub type Result<T> = std::result::Result<T, Error>;

/// Opaque head frame for reports whose concrete context type has
/// been given up. The original context stays reachable underneath it
/// through [`Error::downcast_ref`].
#[derive(Debug, ThisError)]
#[error("request failed")]
struct Erased;

/// What a failed request carries: the client-facing taxonomy value
/// that becomes the response body, plus the full report and span
/// trace that only ever reach the log.
pub struct Error {
  error_type: types::Error,
  report: Report<Erased>,
  trace: SpanTrace,
}

impl Error {
  #[must_use]
  pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
    Self {
      error_type,
      report: Report::new(context).change_context(Erased),
      trace: SpanTrace::capture(),
    }
  }

  #[must_use]
  pub fn from_report(error_type: types::Error, report: Report<impl Context>) -> Self {
    Self {
      error_type,
      report: report.change_context(Erased),
      trace: SpanTrace::capture(),
    }
  }
}

impl Error {
  #[must_use]
  pub fn as_type(&self) -> &types::Error {
    &self.error_type
  }

  #[must_use]
  pub fn change_type(mut self, error_type: types::Error) -> Self {
    self.error_type = error_type;
    self
  }

  #[must_use]
  pub fn downcast_ref<F: Context>(&self) -> Option<&F> {
    self.report.downcast_ref::<F>()
  }
}

impl std::fmt::Debug for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Error")
      .field("type", &self.error_type)
      .field("report", &self.report)
      .field("trace", &self.trace)
      .finish()
  }
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: ", &self.error_type)?;
    writeln!(f, "{:?}", self.report)?;
    std::fmt::Display::fmt(&self.trace, f)
  }
}
