use std::borrow::Cow;
use validator::ValidateError;

use crate::http::{Actor, Error};
use crate::schema::User;
use crate::store::ReadOptions;
use crate::types::id::marker::Marker;
use crate::types::{Error as ErrorType, Id};

pub mod boards;
pub mod comments;
pub mod events;
pub mod notifications;
pub mod users;

/// Single-field validation failure, for checks only the service can
/// make (cross-entity rules, identifier shape on write paths).
pub(crate) fn field_error(
  field: &'static str,
  message: impl Into<Cow<'static, str>>,
) -> ValidateError {
  let mut fields = ValidateError::field_builder();
  let mut error = ValidateError::msg_builder();
  error.insert(message);
  fields.insert(field, error.build());
  fields.build()
}

/// Strict identifier parse for write paths. Read paths parse
/// leniently and treat a malformed id as absent instead.
pub(crate) fn parse_id<M: Marker>(field: &'static str, value: &str) -> Result<Id<M>, Error> {
  Id::parse(value.trim()).ok_or_else(|| field_error(field, "Invalid identifier").into())
}

/// Moderation visibility is honored only for admin callers; everyone
/// else gets the default view no matter what they asked for.
pub(crate) fn read_options(actor: &Actor, include_pending: bool) -> ReadOptions {
  ReadOptions {
    include_pending: include_pending && actor.is_admin(),
  }
}

pub(crate) fn require_admin(user: &User) -> Result<(), Error> {
  #[derive(Debug, thiserror::Error)]
  #[error("Attempt to perform an admin-only operation")]
  struct NotAdmin;
  if user.admin {
    Ok(())
  } else {
    Err(Error::from_context(ErrorType::Forbidden, NotAdmin))
  }
}
