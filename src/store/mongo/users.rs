use async_trait::async_trait;
use mongodb::bson::{doc, DateTime};

use super::MongoStore;
use crate::database::{self, ErrorExt};
use crate::schema::User;
use crate::store::{paginate, NewUser, UserStore};
use crate::types::id::marker::{BoardMarker, UserMarker};
use crate::types::{Id, Page, PageRequest};

#[async_trait]
impl UserStore for MongoStore {
  async fn insert(&self, input: NewUser) -> database::Result<User> {
    let user = User {
      id: Id::new(),
      name: input.name,
      display_name: input.display_name,
      email: input.email,
      password_hash: input.password_hash,
      admin: input.admin,
      slug: input.slug,
      shared_posts: Vec::new(),
      saved_posts: Vec::new(),
      created_at: DateTime::now(),
      updated_at: None,
    };
    // Taken names bounce off the unique index as a duplicate error.
    self.users.insert_one(&user, None).await.into_db_error()?;
    Ok(user)
  }

  async fn find_by_id(&self, id: Id<UserMarker>) -> database::Result<Option<User>> {
    self
      .users
      .find_one(doc! { "_id": id }, None)
      .await
      .into_db_error()
  }

  async fn find_by_name(&self, name: &str) -> database::Result<Option<User>> {
    self
      .users
      .find_one(doc! { "name": name }, None)
      .await
      .into_db_error()
  }

  async fn add_shared_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let result = self
      .users
      .update_one(
        doc! { "_id": user_id },
        doc! {
          "$addToSet": { "shared_posts": board_id },
          "$set": { "updated_at": DateTime::now() },
        },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.matched_count > 0)
  }

  async fn add_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let result = self
      .users
      .update_one(
        doc! { "_id": user_id },
        doc! {
          "$addToSet": { "saved_posts": board_id },
          "$set": { "updated_at": DateTime::now() },
        },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.matched_count > 0)
  }

  async fn remove_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let result = self
      .users
      .update_one(
        doc! { "_id": user_id },
        doc! {
          "$pull": { "saved_posts": board_id },
          "$set": { "updated_at": DateTime::now() },
        },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.matched_count > 0)
  }

  async fn list_shared_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>> {
    let Some(user) = self.find_by_id(user_id).await? else {
      return Ok(Page::empty());
    };

    // Sets append on add, so the back of the list is the newest.
    let ids = user.shared_posts.iter().rev().copied().collect::<Vec<_>>();
    Ok(paginate(ids, page))
  }

  async fn list_saved_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>> {
    let Some(user) = self.find_by_id(user_id).await? else {
      return Ok(Page::empty());
    };

    let ids = user.saved_posts.iter().rev().copied().collect::<Vec<_>>();
    Ok(paginate(ids, page))
  }
}
