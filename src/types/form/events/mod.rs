use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Event, EventView};

pub mod create;
pub mod update;

#[derive(Debug, Deserialize, Serialize)]
pub struct EventData {
  pub id: String,
  pub created_by: String,
  pub title: String,
  pub description: String,
  pub location: String,
  pub starts_at: DateTime<Utc>,
  pub ends_at: DateTime<Utc>,
  pub images: Vec<String>,
  pub hashtags: Vec<String>,
  pub participants: Vec<String>,
  pub participants_count: u64,
  pub likes_count: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl From<Event> for EventData {
  fn from(event: Event) -> Self {
    Self {
      id: event.id.to_hex(),
      created_by: event.created_by.to_hex(),
      title: event.title,
      description: event.description,
      location: event.location,
      starts_at: event.starts_at.to_chrono(),
      ends_at: event.ends_at.to_chrono(),
      images: event.images,
      hashtags: event.hashtags,
      participants_count: event.participants.len() as u64,
      likes_count: event.likes.len() as u64,
      participants: event.participants.iter().map(|id| id.to_hex()).collect(),
      created_at: event.created_at.to_chrono(),
      updated_at: event.updated_at.map(|at| at.to_chrono()),
    }
  }
}

impl From<EventView> for EventData {
  fn from(view: EventView) -> Self {
    view.event.into()
  }
}
