use async_trait::async_trait;
use mongodb::bson::{doc, DateTime, Document};

use super::{contains_filter, fetch_all, fetch_page, return_after, MongoStore};
use crate::database::{self, ErrorExt};
use crate::schema::{Event, EventView};
use crate::store::{EventPatch, EventStore, NewEvent};
use crate::types::id::marker::{EventMarker, UserMarker};
use crate::types::{Id, Page, PageRequest};
use crate::util::text::extract_hashtags;

fn soonest_first() -> Document {
  doc! { "starts_at": 1, "_id": 1 }
}

#[async_trait]
impl EventStore for MongoStore {
  async fn create(&self, input: NewEvent) -> database::Result<Event> {
    let event = Event {
      id: Id::new(),
      created_by: input.created_by,
      title: input.title,
      hashtags: extract_hashtags(&input.description),
      description: input.description,
      location: input.location,
      starts_at: input.starts_at,
      ends_at: input.ends_at,
      images: input.images,
      participants: Vec::new(),
      likes: Vec::new(),
      destroyed: false,
      created_at: DateTime::now(),
      updated_at: None,
    };
    self.events.insert_one(&event, None).await.into_db_error()?;
    Ok(event)
  }

  async fn find_by_id(&self, id: Id<EventMarker>) -> database::Result<Option<EventView>> {
    let event = self
      .events
      .find_one(doc! { "_id": id, "destroyed": false }, None)
      .await
      .into_db_error()?;

    Ok(event.map(|event| EventView {
      participants_count: event.participants.len() as u64,
      likes_count: event.likes.len() as u64,
      event,
    }))
  }

  async fn list_page(&self, page: PageRequest) -> database::Result<Page<Event>> {
    fetch_page(&self.events, doc! { "destroyed": false }, soonest_first(), page).await
  }

  async fn search(&self, term: &str) -> database::Result<Vec<Event>> {
    let term = term.trim();
    if term.is_empty() {
      return Ok(Vec::new());
    }

    let filter = doc! {
      "destroyed": false,
      "$or": [
        { "title": contains_filter(term) },
        { "description": contains_filter(term) },
        { "hashtags": contains_filter(term) },
      ],
    };
    fetch_all(&self.events, filter, soonest_first()).await
  }

  async fn update(
    &self,
    id: Id<EventMarker>,
    patch: EventPatch,
  ) -> database::Result<Option<Event>> {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(title) = patch.title {
      set.insert("title", title);
    }
    if let Some(description) = patch.description {
      set.insert("hashtags", extract_hashtags(&description));
      set.insert("description", description);
    }
    if let Some(location) = patch.location {
      set.insert("location", location);
    }
    if let Some(starts_at) = patch.starts_at {
      set.insert("starts_at", starts_at);
    }
    if let Some(ends_at) = patch.ends_at {
      set.insert("ends_at", ends_at);
    }
    if let Some(images) = patch.images {
      set.insert("images", images);
    }

    self
      .events
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! { "$set": set },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn add_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>> {
    self
      .events
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! {
          "$addToSet": { "participants": user_id },
          "$set": { "updated_at": DateTime::now() },
        },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn remove_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>> {
    self
      .events
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! {
          "$pull": { "participants": user_id },
          "$set": { "updated_at": DateTime::now() },
        },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn soft_delete(&self, id: Id<EventMarker>) -> database::Result<bool> {
    let result = self
      .events
      .update_one(
        doc! { "_id": id, "destroyed": false },
        doc! { "$set": { "destroyed": true, "updated_at": DateTime::now() } },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.matched_count > 0)
  }
}
