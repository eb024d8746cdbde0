use async_trait::async_trait;
use mongodb::bson::{doc, Bson, DateTime};
use mongodb::options::UpdateModifications;

use super::{
  contains_filter, fetch_all, fetch_page, newest_first, return_after, tag_filter, to_bson,
  visibility_filter, MongoStore,
};
use crate::database::{self, ErrorExt};
use crate::schema::{Board, BoardView};
use crate::store::{hashtag_needle, BoardPatch, BoardStore, NewBoard, ReadOptions};
use crate::types::id::marker::{BoardMarker, UserMarker};
use crate::types::{Id, Page, PageRequest};
use crate::util::text::extract_hashtags;

#[async_trait]
impl BoardStore for MongoStore {
  async fn create(&self, input: NewBoard) -> database::Result<Board> {
    let board = Board {
      id: Id::new(),
      author_id: input.author_id,
      title: input.title,
      description: input.description,
      language: input.language,
      hashtags: extract_hashtags(&input.content),
      content: input.content,
      images: input.images,
      video: input.video,
      likes: Vec::new(),
      shared_with: Vec::new(),
      is_pending: true,
      destroyed: false,
      created_at: DateTime::now(),
      updated_at: None,
    };
    self.boards.insert_one(&board, None).await.into_db_error()?;
    Ok(board)
  }

  async fn find_by_id(
    &self,
    id: Id<BoardMarker>,
    opts: ReadOptions,
  ) -> database::Result<Option<BoardView>> {
    let mut filter = visibility_filter(opts);
    filter.insert("_id", id);

    let Some(board) = self.boards.find_one(filter, None).await.into_db_error()? else {
      return Ok(None);
    };

    let comments_count = self
      .comments
      .count_documents(doc! { "board_id": id, "destroyed": false }, None)
      .await
      .into_db_error()?;

    Ok(Some(BoardView {
      likes_count: board.likes.len() as u64,
      comments_count,
      board,
    }))
  }

  async fn list_page(
    &self,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    fetch_page(&self.boards, visibility_filter(opts), newest_first(), page).await
  }

  async fn search(&self, term: &str, opts: ReadOptions) -> database::Result<Vec<Board>> {
    let term = term.trim();
    if term.is_empty() {
      return Ok(Vec::new());
    }

    let mut filter = visibility_filter(opts);
    filter.insert(
      "$or",
      vec![
        doc! { "title": contains_filter(term) },
        doc! { "description": contains_filter(term) },
        doc! { "content": contains_filter(term) },
        doc! { "hashtags": contains_filter(term) },
      ],
    );
    fetch_all(&self.boards, filter, newest_first()).await
  }

  async fn list_by_hashtag(
    &self,
    tag: &str,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    let needle = hashtag_needle(tag);
    let mut filter = visibility_filter(opts);
    filter.insert("hashtags", tag_filter(&needle));
    fetch_page(&self.boards, filter, newest_first(), page).await
  }

  async fn list_by_author(
    &self,
    author_id: Id<UserMarker>,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    let mut filter = visibility_filter(opts);
    filter.insert("author_id", author_id);
    fetch_page(&self.boards, filter, newest_first(), page).await
  }

  async fn update(
    &self,
    id: Id<BoardMarker>,
    patch: BoardPatch,
  ) -> database::Result<Option<Board>> {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(title) = patch.title {
      set.insert("title", title);
    }
    if let Some(description) = patch.description {
      set.insert("description", description);
    }
    if let Some(language) = patch.language {
      set.insert("language", language);
    }
    if let Some(content) = patch.content {
      // Hashtags ride along in the same write so they never go stale.
      set.insert("hashtags", extract_hashtags(&content));
      set.insert("content", content);
    }
    if let Some(images) = patch.images {
      set.insert("images", images);
    }
    if let Some(video) = patch.video {
      set.insert("video", to_bson(&video)?);
    }

    self
      .boards
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! { "$set": set },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn set_moderation(
    &self,
    id: Id<BoardMarker>,
    is_pending: bool,
  ) -> database::Result<Option<Board>> {
    self
      .boards
      .find_one_and_update(
        doc! { "_id": id, "destroyed": false },
        doc! { "$set": { "is_pending": is_pending, "updated_at": DateTime::now() } },
        return_after(),
      )
      .await
      .into_db_error()
  }

  async fn add_share(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<bool> {
    let result = self
      .boards
      .update_one(
        doc! { "_id": id, "destroyed": false },
        doc! {
          "$addToSet": { "shared_with": user_id },
          "$set": { "updated_at": DateTime::now() },
        },
        None,
      )
      .await
      .into_db_error()?;
    Ok(result.matched_count > 0)
  }

  async fn toggle_like(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Board>> {
    // A pipeline update keeps the membership check and the flip in
    // one document mutation, so concurrent toggles cannot lose one
    // another's writes.
    let user = Bson::from(user_id);
    let update = UpdateModifications::Pipeline(vec![doc! {
      "$set": {
        "likes": {
          "$cond": [
            { "$in": [user.clone(), { "$ifNull": ["$likes", []] }] },
            { "$setDifference": ["$likes", [user.clone()]] },
            { "$concatArrays": [{ "$ifNull": ["$likes", []] }, [user]] },
          ]
        },
        "updated_at": DateTime::now(),
      }
    }]);

    self
      .boards
      .find_one_and_update(doc! { "_id": id, "destroyed": false }, update, return_after())
      .await
      .into_db_error()
  }

  async fn delete(&self, id: Id<BoardMarker>) -> database::Result<bool> {
    let result = self
      .boards
      .delete_one(doc! { "_id": id }, None)
      .await
      .into_db_error()?;
    Ok(result.deleted_count > 0)
  }
}
