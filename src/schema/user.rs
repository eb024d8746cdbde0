use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{BoardMarker, UserMarker};
use crate::types::Id;
use crate::util::Sensitive;

/// `shared_posts` and `saved_posts` are membership sets mutated only
/// through the user store, never rewritten wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
  #[serde(rename = "_id")]
  pub id: Id<UserMarker>,
  pub name: String,
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub password_hash: Sensitive<String>,
  pub admin: bool,
  pub slug: String,
  #[serde(default)]
  pub shared_posts: Vec<Id<BoardMarker>>,
  #[serde(default)]
  pub saved_posts: Vec<Id<BoardMarker>>,
  pub created_at: DateTime,
  pub updated_at: Option<DateTime>,
}

impl User {
  /// Name shown to other users.
  #[must_use]
  pub fn visible_name(&self) -> &str {
    self.display_name.as_deref().unwrap_or(&self.name)
  }
}
