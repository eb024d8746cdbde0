use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Display;
use validator::ValidateError;

/// Client-facing error categories.
///
/// This is the body every failed request serializes to, tagged by
/// `type`. Whatever caused the failure internally travels separately
/// in the report of [`crate::http::Error`] and never reaches the
/// client.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
  Internal,
  Dependency,
  Conflict,
  NotFound { message: Cow<'static, str> },
  Unauthorized,
  Forbidden,
  InvalidFormBody(ValidateError),
}

impl Error {
  pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
    Self::NotFound {
      message: message.into(),
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Internal => f.write_str("Internal server error. Please try again later"),
      Self::Dependency => f.write_str("Service is temporarily unavailable. Please try again later"),
      Self::Conflict => f.write_str("Request conflicts with the current state"),
      Self::NotFound { message } => Display::fmt(message, f),
      Self::Unauthorized => f.write_str("Authentication required"),
      Self::Forbidden => f.write_str("You're not allowed to do that"),
      Self::InvalidFormBody(..) => f.write_str("Invalid form body"),
    }
  }
}
