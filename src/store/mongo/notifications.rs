use async_trait::async_trait;
use mongodb::bson::{doc, DateTime};

use super::{fetch_all, newest_first, MongoStore};
use crate::database::{self, ErrorExt};
use crate::schema::{Notification, NotificationKind};
use crate::store::{NewNotification, NotificationStore};
use crate::types::id::marker::UserMarker;
use crate::types::Id;

#[async_trait]
impl NotificationStore for MongoStore {
  async fn insert(&self, input: NewNotification) -> database::Result<Notification> {
    if input.kind == NotificationKind::Rating {
      if let Some(comment_id) = input.comment_id {
        // A flip-flopping voter keeps one current entry, not a pile.
        self
          .notifications
          .delete_many(
            doc! {
              "kind": "rating",
              "owner_id": input.owner_id,
              "comment_id": comment_id,
            },
            None,
          )
          .await
          .into_db_error()?;
      }
    }

    let notification = Notification {
      id: Id::new(),
      owner_id: input.owner_id,
      actor_name: input.actor_name,
      kind: input.kind,
      board_id: input.board_id,
      comment_id: input.comment_id,
      message: input.message,
      read: false,
      created_at: DateTime::now(),
    };
    self
      .notifications
      .insert_one(&notification, None)
      .await
      .into_db_error()?;
    Ok(notification)
  }

  async fn list_by_owner(
    &self,
    owner_id: Id<UserMarker>,
  ) -> database::Result<Vec<Notification>> {
    fetch_all(
      &self.notifications,
      doc! { "owner_id": owner_id },
      newest_first(),
    )
    .await
  }

  async fn count_unread(&self, owner_id: Id<UserMarker>) -> database::Result<u64> {
    self
      .notifications
      .count_documents(doc! { "owner_id": owner_id, "read": false }, None)
      .await
      .into_db_error()
  }

  async fn mark_all_read(&self, owner_id: Id<UserMarker>) -> database::Result<u64> {
    let result = self
      .notifications
      .update_many(
        doc! { "owner_id": owner_id, "read": false },
        doc! { "$set": { "read": true } },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.modified_count)
  }
}
