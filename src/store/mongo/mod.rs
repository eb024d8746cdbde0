use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::ReadOptions;
use crate::database::{self, ErrorExt};
use crate::schema::{Board, Comment, Event, Notification, Session, User};
use crate::types::{Page, PageRequest};

mod boards;
mod comments;
mod events;
mod notifications;
mod sessions;
mod users;

/// MongoDB backend. One typed collection handle per aggregate; all
/// query shapes live in the per-aggregate modules next to this one.
#[derive(Clone)]
pub struct MongoStore {
  boards: Collection<Board>,
  comments: Collection<Comment>,
  users: Collection<User>,
  events: Collection<Event>,
  notifications: Collection<Notification>,
  sessions: Collection<Session>,
}

impl MongoStore {
  pub(crate) fn new(db: &database::Database) -> Self {
    Self {
      boards: db.collection("boards"),
      comments: db.collection("comments"),
      users: db.collection("users"),
      events: db.collection("events"),
      notifications: db.collection("notifications"),
      sessions: db.collection("sessions"),
    }
  }

  /// Indexes the query shapes below depend on. Safe to run on every
  /// boot; the server treats existing definitions as a no-op.
  #[tracing::instrument(name = "db.create_indexes", skip_all)]
  pub(crate) async fn create_indexes(&self) -> database::Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    self
      .users
      .create_index(
        IndexModel::builder()
          .keys(doc! { "name": 1 })
          .options(unique.clone())
          .build(),
        None,
      )
      .await
      .into_db_error()?;

    self
      .sessions
      .create_indexes(
        [
          IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(unique)
            .build(),
          // Lets the server reap expired sessions on its own.
          IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder().expire_after(Duration::ZERO).build())
            .build(),
        ],
        None,
      )
      .await
      .into_db_error()?;

    self
      .boards
      .create_indexes(
        [
          IndexModel::builder()
            .keys(doc! { "created_at": -1, "_id": -1 })
            .build(),
          IndexModel::builder()
            .keys(doc! { "author_id": 1, "created_at": -1 })
            .build(),
          IndexModel::builder().keys(doc! { "hashtags": 1 }).build(),
        ],
        None,
      )
      .await
      .into_db_error()?;

    self
      .comments
      .create_index(
        IndexModel::builder()
          .keys(doc! { "board_id": 1, "created_at": -1 })
          .build(),
        None,
      )
      .await
      .into_db_error()?;

    self
      .notifications
      .create_index(
        IndexModel::builder()
          .keys(doc! { "owner_id": 1, "created_at": -1 })
          .build(),
        None,
      )
      .await
      .into_db_error()?;

    self
      .events
      .create_index(IndexModel::builder().keys(doc! { "starts_at": 1 }).build(), None)
      .await
      .into_db_error()?;

    Ok(())
  }
}

/// Base filter applied to every board read.
fn visibility_filter(opts: ReadOptions) -> Document {
  let mut filter = doc! { "destroyed": false };
  if !opts.include_pending {
    filter.insert("is_pending", false);
  }
  filter
}

fn newest_first() -> Document {
  doc! { "created_at": -1, "_id": -1 }
}

/// Anchored, case-insensitive element match against an array field.
fn tag_filter(needle: &str) -> Document {
  doc! { "$regex": format!("^{}$", regex::escape(needle)), "$options": "i" }
}

fn contains_filter(term: &str) -> Document {
  doc! { "$regex": regex::escape(term), "$options": "i" }
}

/// Mutations hand the updated document back, not the stale one.
fn return_after() -> FindOneAndUpdateOptions {
  FindOneAndUpdateOptions::builder()
    .return_document(ReturnDocument::After)
    .build()
}

fn to_bson<T: Serialize>(value: &T) -> database::Result<Bson> {
  mongodb::bson::to_bson(value)
    .map_err(mongodb::error::Error::from)
    .into_db_error()
}

/// Runs the shared count-then-window pagination contract over a
/// filtered collection.
async fn fetch_page<T>(
  collection: &Collection<T>,
  filter: Document,
  sort: Document,
  page: PageRequest,
) -> database::Result<Page<T>>
where
  T: DeserializeOwned + Unpin + Send + Sync,
{
  let total_count = collection
    .count_documents(filter.clone(), None)
    .await
    .into_db_error()?;

  let options = FindOptions::builder()
    .sort(sort)
    .skip(page.skip())
    .limit(page.limit())
    .build();
  let items = collection
    .find(filter, options)
    .await
    .into_db_error()?
    .try_collect()
    .await
    .into_db_error()?;

  Ok(Page { items, total_count })
}

async fn fetch_all<T>(
  collection: &Collection<T>,
  filter: Document,
  sort: Document,
) -> database::Result<Vec<T>>
where
  T: DeserializeOwned + Unpin + Send + Sync,
{
  let options = FindOptions::builder().sort(sort).build();
  collection
    .find(filter, options)
    .await
    .into_db_error()?
    .try_collect()
    .await
    .into_db_error()
}
