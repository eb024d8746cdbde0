use async_trait::async_trait;
use mongodb::bson::{doc, DateTime};

use super::MongoStore;
use crate::database::{self, ErrorExt};
use crate::schema::Session;
use crate::store::{NewSession, SessionStore};
use crate::types::id::marker::SessionMarker;
use crate::types::Id;

#[async_trait]
impl SessionStore for MongoStore {
  async fn insert(&self, input: NewSession) -> database::Result<Session> {
    let session = Session {
      id: Id::new(),
      user_id: input.user_id,
      token_hash: input.token_hash,
      created_at: DateTime::now(),
      expires_at: input.expires_at,
    };
    self
      .sessions
      .insert_one(&session, None)
      .await
      .into_db_error()?;
    Ok(session)
  }

  async fn find_by_token_hash(&self, token_hash: &str) -> database::Result<Option<Session>> {
    // The TTL reaper runs on its own schedule, so expiry is also
    // checked here.
    self
      .sessions
      .find_one(
        doc! { "token_hash": token_hash, "expires_at": { "$gt": DateTime::now() } },
        None,
      )
      .await
      .into_db_error()
  }

  async fn delete(&self, id: Id<SessionMarker>) -> database::Result<bool> {
    let result = self
      .sessions
      .delete_one(doc! { "_id": id }, None)
      .await
      .into_db_error()?;
    Ok(result.deleted_count > 0)
  }

  async fn delete_by_token_hash(&self, token_hash: &str) -> database::Result<bool> {
    let result = self
      .sessions
      .delete_one(doc! { "token_hash": token_hash }, None)
      .await
      .into_db_error()?;
    Ok(result.deleted_count > 0)
  }
}
