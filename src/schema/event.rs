use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::types::id::marker::{EventMarker, UserMarker};
use crate::types::Id;

/// A scheduled community event. Unlike boards, events are only ever
/// soft-deleted, and their hashtags derive from `description`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
  #[serde(rename = "_id")]
  pub id: Id<EventMarker>,
  pub created_by: Id<UserMarker>,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub location: String,
  pub starts_at: DateTime,
  pub ends_at: DateTime,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(default)]
  pub participants: Vec<Id<UserMarker>>,
  #[serde(default)]
  pub likes: Vec<Id<UserMarker>>,
  #[serde(default)]
  pub hashtags: Vec<String>,
  pub destroyed: bool,
  pub created_at: DateTime,
  pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventView {
  #[serde(flatten)]
  pub event: Event,
  pub participants_count: u64,
  pub likes_count: u64,
}
