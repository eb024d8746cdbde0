use async_trait::async_trait;
use mongodb::bson::{doc, Bson, DateTime};
use mongodb::options::UpdateModifications;

use super::{fetch_page, newest_first, return_after, to_bson, MongoStore};
use crate::database::{self, ErrorExt};
use crate::schema::{Comment, CommentVote, VoteDirection};
use crate::store::{CommentPatch, CommentStore, NewComment};
use crate::types::id::marker::{BoardMarker, CommentMarker, UserMarker};
use crate::types::{Id, Page, PageRequest};

#[async_trait]
impl CommentStore for MongoStore {
  async fn create(&self, input: NewComment) -> database::Result<Comment> {
    let comment = Comment {
      id: Id::new(),
      board_id: input.board_id,
      parent_id: input.parent_id,
      author_id: input.author_id,
      username: input.username,
      content: input.content,
      votes: Vec::new(),
      upvotes: 0,
      downvotes: 0,
      destroyed: false,
      created_at: DateTime::now(),
      updated_at: None,
    };
    self
      .comments
      .insert_one(&comment, None)
      .await
      .into_db_error()?;
    Ok(comment)
  }

  async fn find_by_id(&self, id: Id<CommentMarker>) -> database::Result<Option<Comment>> {
    self
      .comments
      .find_one(doc! { "_id": id, "destroyed": false }, None)
      .await
      .into_db_error()
  }

  async fn list_by_board(
    &self,
    board_id: Id<BoardMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Comment>> {
    let filter = doc! { "board_id": board_id, "destroyed": false };
    fetch_page(&self.comments, filter, newest_first(), page).await
  }

  async fn vote(
    &self,
    id: Id<CommentMarker>,
    user_id: Id<UserMarker>,
    direction: VoteDirection,
  ) -> database::Result<Option<Comment>> {
    let now = DateTime::now();
    let user = Bson::from(user_id);
    let cast = to_bson(&CommentVote {
      user_id,
      direction,
      created_at: now,
    })?;

    // One pipeline mutation rewrites the vote list and recomputes
    // both counters from it, so concurrent votes cannot leave the
    // counters out of step with the list. Casting the direction
    // already held retracts the vote; the opposite one replaces it.
    let update = UpdateModifications::Pipeline(vec![
      doc! {
        "$set": {
          "votes": {
            "$let": {
              "vars": {
                "mine": {
                  "$filter": {
                    "input": { "$ifNull": ["$votes", []] },
                    "as": "vote",
                    "cond": { "$eq": ["$$vote.user_id", user.clone()] },
                  }
                },
                "others": {
                  "$filter": {
                    "input": { "$ifNull": ["$votes", []] },
                    "as": "vote",
                    "cond": { "$ne": ["$$vote.user_id", user] },
                  }
                },
              },
              "in": {
                "$cond": [
                  {
                    "$eq": [
                      { "$arrayElemAt": ["$$mine.direction", 0] },
                      direction.as_str(),
                    ]
                  },
                  "$$others",
                  { "$concatArrays": ["$$others", [cast]] },
                ]
              }
            }
          },
        }
      },
      doc! {
        "$set": {
          "upvotes": {
            "$size": {
              "$filter": {
                "input": "$votes",
                "as": "vote",
                "cond": { "$eq": ["$$vote.direction", "up"] },
              }
            }
          },
          "downvotes": {
            "$size": {
              "$filter": {
                "input": "$votes",
                "as": "vote",
                "cond": { "$eq": ["$$vote.direction", "down"] },
              }
            }
          },
          "updated_at": now,
        }
      },
    ]);

    self
      .comments
      .find_one_and_update(doc! { "_id": id, "destroyed": false }, update, return_after())
      .await
      .into_db_error()
  }

  async fn update(
    &self,
    id: Id<CommentMarker>,
    patch: CommentPatch,
  ) -> database::Result<Option<Comment>> {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(content) = patch.content {
      set.insert("content", content);
    }

    self
      .comments
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! { "$set": set },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn delete(&self, id: Id<CommentMarker>) -> database::Result<bool> {
    let result = self
      .comments
      .delete_one(doc! { "_id": id }, None)
      .await
      .into_db_error()?;
    Ok(result.deleted_count > 0)
  }

  async fn delete_by_board(&self, board_id: Id<BoardMarker>) -> database::Result<u64> {
    let result = self
      .comments
      .delete_many(doc! { "board_id": board_id }, None)
      .await
      .into_db_error()?;
    Ok(result.deleted_count)
  }
}
