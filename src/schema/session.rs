use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{SessionMarker, UserMarker};
use crate::types::Id;

/// A persisted refresh session. Only the SHA-256 digest of the
/// refresh token is stored; the token itself never touches disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
  #[serde(rename = "_id")]
  pub id: Id<SessionMarker>,
  pub user_id: Id<UserMarker>,
  pub token_hash: String,
  pub created_at: DateTime,
  pub expires_at: DateTime,
}
