use async_trait::async_trait;
use mongodb::bson::DateTime;
use std::sync::Arc;

use crate::database;
use crate::schema::{
  Board, BoardVideo, BoardView, Comment, Event, EventView, Notification, NotificationKind,
  Session, User, VoteDirection,
};
use crate::types::id::marker::{
  BoardMarker, CommentMarker, EventMarker, SessionMarker, UserMarker,
};
use crate::types::{Id, Page, PageRequest};
use crate::util::Sensitive;

pub mod memory;
pub mod mongo;

/// Moderation visibility for read operations.
///
/// The single recognized option defaults to `false`, so pending
/// boards stay hidden unless the caller explicitly opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
  pub include_pending: bool,
}

impl ReadOptions {
  /// Visibility used by admin and internal callers.
  #[must_use]
  pub const fn moderation_inclusive() -> Self {
    Self {
      include_pending: true,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewBoard {
  pub author_id: Id<UserMarker>,
  pub title: String,
  pub description: String,
  pub language: String,
  pub content: String,
  pub images: Vec<String>,
  pub video: Option<BoardVideo>,
}

/// Whitelisted partial update. `None` fields are left untouched;
/// a present `content` makes the store recompute the hashtags in
/// the same write.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub language: Option<String>,
  pub content: Option<String>,
  pub images: Option<Vec<String>>,
  pub video: Option<BoardVideo>,
}

#[async_trait]
pub trait BoardStore: Send + Sync {
  /// Persists a new board in the pending moderation state, deriving
  /// its hashtags from `content`.
  async fn create(&self, input: NewBoard) -> database::Result<Board>;

  /// `None` covers missing, soft-deleted and moderation-hidden
  /// boards alike.
  async fn find_by_id(
    &self,
    id: Id<BoardMarker>,
    opts: ReadOptions,
  ) -> database::Result<Option<BoardView>>;

  /// Newest first by creation time, ties broken by id.
  async fn list_page(&self, page: PageRequest, opts: ReadOptions)
    -> database::Result<Page<Board>>;

  /// Case-insensitive substring search over title, description,
  /// content and hashtags. A blank term yields nothing.
  async fn search(&self, term: &str, opts: ReadOptions) -> database::Result<Vec<Board>>;

  async fn list_by_hashtag(
    &self,
    tag: &str,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>>;

  async fn list_by_author(
    &self,
    author_id: Id<UserMarker>,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>>;

  async fn update(&self, id: Id<BoardMarker>, patch: BoardPatch)
    -> database::Result<Option<Board>>;

  /// The only sanctioned way to flip the moderation flag.
  async fn set_moderation(
    &self,
    id: Id<BoardMarker>,
    is_pending: bool,
  ) -> database::Result<Option<Board>>;

  /// Atomic, idempotent set-add. Sharing is monotonic; there is no
  /// remove counterpart. Returns whether the board exists.
  async fn add_share(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<bool>;

  /// Atomically flips like membership in one document mutation.
  async fn toggle_like(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Board>>;

  /// Hard delete. Does not cascade to comments by itself.
  async fn delete(&self, id: Id<BoardMarker>) -> database::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub board_id: Id<BoardMarker>,
  pub parent_id: Option<Id<CommentMarker>>,
  pub author_id: Id<UserMarker>,
  pub username: String,
  pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
  pub content: Option<String>,
}

#[async_trait]
pub trait CommentStore: Send + Sync {
  async fn create(&self, input: NewComment) -> database::Result<Comment>;

  async fn find_by_id(&self, id: Id<CommentMarker>) -> database::Result<Option<Comment>>;

  async fn list_by_board(
    &self,
    board_id: Id<BoardMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Comment>>;

  /// One vote per user: voting the same direction again retracts it,
  /// the opposite direction replaces it. Counters are recomputed from
  /// the votes list inside the same atomic write.
  async fn vote(
    &self,
    id: Id<CommentMarker>,
    user_id: Id<UserMarker>,
    direction: VoteDirection,
  ) -> database::Result<Option<Comment>>;

  async fn update(
    &self,
    id: Id<CommentMarker>,
    patch: CommentPatch,
  ) -> database::Result<Option<Comment>>;

  async fn delete(&self, id: Id<CommentMarker>) -> database::Result<bool>;

  /// Removes every comment of a board; used by the configurable
  /// cascade on board deletion.
  async fn delete_by_board(&self, board_id: Id<BoardMarker>) -> database::Result<u64>;
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub password_hash: Sensitive<String>,
  pub admin: bool,
  pub slug: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with [`database::Error::Duplicate`] when the name is
  /// already taken.
  async fn insert(&self, input: NewUser) -> database::Result<User>;

  async fn find_by_id(&self, id: Id<UserMarker>) -> database::Result<Option<User>>;

  async fn find_by_name(&self, name: &str) -> database::Result<Option<User>>;

  /// Atomic set-add; returns whether the user exists.
  async fn add_shared_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool>;

  async fn add_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool>;

  async fn remove_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool>;

  /// Windows over the user's shared set, most recently added first.
  async fn list_shared_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>>;

  async fn list_saved_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>>;
}

#[derive(Debug, Clone)]
pub struct NewEvent {
  pub created_by: Id<UserMarker>,
  pub title: String,
  pub description: String,
  pub location: String,
  pub starts_at: DateTime,
  pub ends_at: DateTime,
  pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub location: Option<String>,
  pub starts_at: Option<DateTime>,
  pub ends_at: Option<DateTime>,
  pub images: Option<Vec<String>>,
}

#[async_trait]
pub trait EventStore: Send + Sync {
  /// Derives hashtags from the description.
  async fn create(&self, input: NewEvent) -> database::Result<Event>;

  /// Detail view with participant and like counters computed at
  /// read time.
  async fn find_by_id(&self, id: Id<EventMarker>) -> database::Result<Option<EventView>>;

  /// Soonest starting time first.
  async fn list_page(&self, page: PageRequest) -> database::Result<Page<Event>>;

  async fn search(&self, term: &str) -> database::Result<Vec<Event>>;

  /// A present `description` makes the store recompute hashtags in
  /// the same write.
  async fn update(&self, id: Id<EventMarker>, patch: EventPatch)
    -> database::Result<Option<Event>>;

  async fn add_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>>;

  async fn remove_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>>;

  /// Events soft-delete where boards hard-delete.
  async fn soft_delete(&self, id: Id<EventMarker>) -> database::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct NewNotification {
  pub owner_id: Id<UserMarker>,
  pub actor_name: String,
  pub kind: NotificationKind,
  pub board_id: Id<BoardMarker>,
  pub comment_id: Option<Id<CommentMarker>>,
  pub message: String,
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
  /// Inserting a rating first drops any earlier rating notification
  /// for the same comment and recipient, so a flip-flopping voter
  /// leaves one current entry instead of a pile.
  async fn insert(&self, input: NewNotification) -> database::Result<Notification>;

  /// Newest first.
  async fn list_by_owner(&self, owner_id: Id<UserMarker>) -> database::Result<Vec<Notification>>;

  async fn count_unread(&self, owner_id: Id<UserMarker>) -> database::Result<u64>;

  /// Returns how many notifications were flipped to read.
  async fn mark_all_read(&self, owner_id: Id<UserMarker>) -> database::Result<u64>;
}

#[derive(Debug, Clone)]
pub struct NewSession {
  pub user_id: Id<UserMarker>,
  pub token_hash: String,
  pub expires_at: DateTime,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
  async fn insert(&self, input: NewSession) -> database::Result<Session>;

  async fn find_by_token_hash(&self, token_hash: &str) -> database::Result<Option<Session>>;

  async fn delete(&self, id: Id<SessionMarker>) -> database::Result<bool>;

  async fn delete_by_token_hash(&self, token_hash: &str) -> database::Result<bool>;
}

/// Per-aggregate handles into one storage backend.
#[derive(Clone)]
pub struct Store {
  pub boards: Arc<dyn BoardStore>,
  pub comments: Arc<dyn CommentStore>,
  pub users: Arc<dyn UserStore>,
  pub events: Arc<dyn EventStore>,
  pub notifications: Arc<dyn NotificationStore>,
  pub sessions: Arc<dyn SessionStore>,
}

impl Store {
  /// Production backend. Creates the indexes the query shapes rely
  /// on before handing the store out.
  pub async fn mongo(db: &database::Database) -> database::Result<Self> {
    let backend = Arc::new(mongo::MongoStore::new(db));
    backend.create_indexes().await?;
    Ok(Self::from_backend(backend))
  }

  /// Process-local backend; doubles as the test stand-in.
  #[must_use]
  pub fn memory() -> Self {
    Self::from_backend(Arc::new(memory::MemoryStore::default()))
  }

  fn from_backend<B>(backend: Arc<B>) -> Self
  where
    B: BoardStore
      + CommentStore
      + UserStore
      + EventStore
      + NotificationStore
      + SessionStore
      + 'static,
  {
    Self {
      boards: backend.clone(),
      comments: backend.clone(),
      users: backend.clone(),
      events: backend.clone(),
      notifications: backend.clone(),
      sessions: backend,
    }
  }
}

impl std::fmt::Debug for Store {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Store").finish_non_exhaustive()
  }
}

/// Normalizes a tag for lookup. Accepts it with or without the
/// leading `#` and lowercases it, since tag matching is
/// case-insensitive everywhere.
pub(crate) fn hashtag_needle(tag: &str) -> String {
  let tag = tag.trim();
  if tag.starts_with('#') {
    tag.to_lowercase()
  } else {
    format!("#{}", tag.to_lowercase())
  }
}

/// Windows an already filtered and sorted set.
pub(crate) fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
  let total_count = items.len() as u64;
  let items = items
    .into_iter()
    .skip(page.skip() as usize)
    .take(page.page_size() as usize)
    .collect();
  Page { items, total_count }
}
