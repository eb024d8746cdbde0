use async_trait::async_trait;
use error_stack::Report;
use mongodb::bson::DateTime;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
  hashtag_needle, paginate, BoardPatch, BoardStore, CommentPatch, CommentStore, EventPatch,
  EventStore, NewBoard, NewComment, NewEvent, NewNotification, NewSession, NewUser,
  NotificationStore, ReadOptions, SessionStore, UserStore,
};
use crate::database;
use crate::schema::{
  Board, BoardView, Comment, CommentVote, Event, EventView, Notification, NotificationKind,
  Session, User, VoteDirection,
};
use crate::types::id::marker::{
  BoardMarker, CommentMarker, EventMarker, SessionMarker, UserMarker,
};
use crate::types::{Id, Page, PageRequest};
use crate::util::text::extract_hashtags;

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct State {
  boards: Vec<Board>,
  comments: Vec<Comment>,
  users: Vec<User>,
  events: Vec<Event>,
  notifications: Vec<Notification>,
  sessions: Vec<Session>,
}

/// Process-local backend keeping every collection behind one lock, so
/// each operation observes and mutates a consistent snapshot. Doubles
/// as the storage stand-in for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: RwLock<State>,
}

impl MemoryStore {
  fn read(&self) -> RwLockReadGuard<'_, State> {
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, State> {
    self.state.write().unwrap_or_else(PoisonError::into_inner)
  }
}

fn board_visible(board: &Board, opts: ReadOptions) -> bool {
  !board.destroyed && (opts.include_pending || !board.is_pending)
}

/// Newest first, ids as the tiebreak so same-instant documents keep
/// a stable order across calls.
fn sort_boards(boards: &mut [Board]) {
  boards.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| b.id.cmp(&a.id))
  });
}

fn sort_comments(comments: &mut [Comment]) {
  comments.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| b.id.cmp(&a.id))
  });
}

fn matches_term(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl BoardStore for MemoryStore {
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
    self.write().boards.push(board.clone());
    Ok(board)
  }

  async fn find_by_id(
    &self,
    id: Id<BoardMarker>,
    opts: ReadOptions,
  ) -> database::Result<Option<BoardView>> {
    let state = self.read();
    let Some(board) = state
      .boards
      .iter()
      .find(|board| board.id == id && board_visible(board, opts))
    else {
      return Ok(None);
    };

    let comments_count = state
      .comments
      .iter()
      .filter(|comment| comment.board_id == id && !comment.destroyed)
      .count() as u64;

    Ok(Some(BoardView {
      likes_count: board.likes.len() as u64,
      comments_count,
      board: board.clone(),
    }))
  }

  async fn list_page(
    &self,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    let mut boards = self
      .read()
      .boards
      .iter()
      .filter(|board| board_visible(board, opts))
      .cloned()
      .collect::<Vec<_>>();

    sort_boards(&mut boards);
    Ok(paginate(boards, page))
  }

  async fn search(&self, term: &str, opts: ReadOptions) -> database::Result<Vec<Board>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
      return Ok(Vec::new());
    }

    let mut boards = self
      .read()
      .boards
      .iter()
      .filter(|board| {
        board_visible(board, opts)
          && (matches_term(&board.title, &term)
            || matches_term(&board.description, &term)
            || matches_term(&board.content, &term)
            || board.hashtags.iter().any(|tag| matches_term(tag, &term)))
      })
      .cloned()
      .collect::<Vec<_>>();

    sort_boards(&mut boards);
    Ok(boards)
  }

  async fn list_by_hashtag(
    &self,
    tag: &str,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    let needle = hashtag_needle(tag);
    let mut boards = self
      .read()
      .boards
      .iter()
      .filter(|board| {
        board_visible(board, opts)
          && board.hashtags.iter().any(|tag| tag.to_lowercase() == needle)
      })
      .cloned()
      .collect::<Vec<_>>();

    sort_boards(&mut boards);
    Ok(paginate(boards, page))
  }

  async fn list_by_author(
    &self,
    author_id: Id<UserMarker>,
    page: PageRequest,
    opts: ReadOptions,
  ) -> database::Result<Page<Board>> {
    let mut boards = self
      .read()
      .boards
      .iter()
      .filter(|board| board.author_id == author_id && board_visible(board, opts))
      .cloned()
      .collect::<Vec<_>>();

    sort_boards(&mut boards);
    Ok(paginate(boards, page))
  }

  async fn update(
    &self,
    id: Id<BoardMarker>,
    patch: BoardPatch,
  ) -> database::Result<Option<Board>> {
    let mut state = self.write();
    let Some(board) = state
      .boards
      .iter_mut()
      .find(|board| board.id == id && !board.destroyed)
    else {
      return Ok(None);
    };

    if let Some(title) = patch.title {
      board.title = title;
    }
    if let Some(description) = patch.description {
      board.description = description;
    }
    if let Some(language) = patch.language {
      board.language = language;
    }
    if let Some(content) = patch.content {
      board.hashtags = extract_hashtags(&content);
      board.content = content;
    }
    if let Some(images) = patch.images {
      board.images = images;
    }
    if let Some(video) = patch.video {
      board.video = Some(video);
    }
    board.updated_at = Some(DateTime::now());

    Ok(Some(board.clone()))
  }

  async fn set_moderation(
    &self,
    id: Id<BoardMarker>,
    is_pending: bool,
  ) -> database::Result<Option<Board>> {
    let mut state = self.write();
    let Some(board) = state
      .boards
      .iter_mut()
      .find(|board| board.id == id && !board.destroyed)
    else {
      return Ok(None);
    };

    board.is_pending = is_pending;
    board.updated_at = Some(DateTime::now());
    Ok(Some(board.clone()))
  }

  async fn add_share(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<bool> {
    let mut state = self.write();
    let Some(board) = state
      .boards
      .iter_mut()
      .find(|board| board.id == id && !board.destroyed)
    else {
      return Ok(false);
    };

    if !board.shared_with.contains(&user_id) {
      board.shared_with.push(user_id);
    }
    board.updated_at = Some(DateTime::now());
    Ok(true)
  }

  async fn toggle_like(
    &self,
    id: Id<BoardMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Board>> {
    let mut state = self.write();
    let Some(board) = state
      .boards
      .iter_mut()
      .find(|board| board.id == id && !board.destroyed)
    else {
      return Ok(None);
    };

    if board.likes.contains(&user_id) {
      board.likes.retain(|liker| *liker != user_id);
    } else {
      board.likes.push(user_id);
    }
    board.updated_at = Some(DateTime::now());
    Ok(Some(board.clone()))
  }

  async fn delete(&self, id: Id<BoardMarker>) -> database::Result<bool> {
    let mut state = self.write();
    let before = state.boards.len();
    state.boards.retain(|board| board.id != id);
    Ok(state.boards.len() != before)
  }
}

#[async_trait]
impl CommentStore for MemoryStore {
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
    self.write().comments.push(comment.clone());
    Ok(comment)
  }

  async fn find_by_id(&self, id: Id<CommentMarker>) -> database::Result<Option<Comment>> {
    Ok(
      self
        .read()
        .comments
        .iter()
        .find(|comment| comment.id == id && !comment.destroyed)
        .cloned(),
    )
  }

  async fn list_by_board(
    &self,
    board_id: Id<BoardMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Comment>> {
    let mut comments = self
      .read()
      .comments
      .iter()
      .filter(|comment| comment.board_id == board_id && !comment.destroyed)
      .cloned()
      .collect::<Vec<_>>();

    sort_comments(&mut comments);
    Ok(paginate(comments, page))
  }

  async fn vote(
    &self,
    id: Id<CommentMarker>,
    user_id: Id<UserMarker>,
    direction: VoteDirection,
  ) -> database::Result<Option<Comment>> {
    let mut state = self.write();
    let Some(comment) = state
      .comments
      .iter_mut()
      .find(|comment| comment.id == id && !comment.destroyed)
    else {
      return Ok(None);
    };

    let now = DateTime::now();
    match comment
      .votes
      .iter()
      .position(|vote| vote.user_id == user_id)
    {
      // Same direction retracts, the opposite one flips.
      Some(index) if comment.votes[index].direction == direction => {
        comment.votes.remove(index);
      },
      Some(index) => {
        comment.votes[index].direction = direction;
        comment.votes[index].created_at = now;
      },
      None => comment.votes.push(CommentVote {
        user_id,
        direction,
        created_at: now,
      }),
    }

    comment.upvotes = comment
      .votes
      .iter()
      .filter(|vote| vote.direction == VoteDirection::Up)
      .count() as u32;
    comment.downvotes = comment
      .votes
      .iter()
      .filter(|vote| vote.direction == VoteDirection::Down)
      .count() as u32;
    comment.updated_at = Some(now);

    Ok(Some(comment.clone()))
  }

  async fn update(
    &self,
    id: Id<CommentMarker>,
    patch: CommentPatch,
  ) -> database::Result<Option<Comment>> {
    let mut state = self.write();
    let Some(comment) = state
      .comments
      .iter_mut()
      .find(|comment| comment.id == id && !comment.destroyed)
    else {
      return Ok(None);
    };

    if let Some(content) = patch.content {
      comment.content = content;
    }
    comment.updated_at = Some(DateTime::now());
    Ok(Some(comment.clone()))
  }

  async fn delete(&self, id: Id<CommentMarker>) -> database::Result<bool> {
    let mut state = self.write();
    let before = state.comments.len();
    state.comments.retain(|comment| comment.id != id);
    Ok(state.comments.len() != before)
  }

  async fn delete_by_board(&self, board_id: Id<BoardMarker>) -> database::Result<u64> {
    let mut state = self.write();
    let before = state.comments.len();
    state.comments.retain(|comment| comment.board_id != board_id);
    Ok((before - state.comments.len()) as u64)
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn insert(&self, input: NewUser) -> database::Result<User> {
    let mut state = self.write();
    if state.users.iter().any(|user| user.name == input.name) {
      return Err(Report::new(database::Error::Duplicate));
    }

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
    state.users.push(user.clone());
    Ok(user)
  }

  async fn find_by_id(&self, id: Id<UserMarker>) -> database::Result<Option<User>> {
    Ok(self.read().users.iter().find(|user| user.id == id).cloned())
  }

  async fn find_by_name(&self, name: &str) -> database::Result<Option<User>> {
    Ok(
      self
        .read()
        .users
        .iter()
        .find(|user| user.name == name)
        .cloned(),
    )
  }

  async fn add_shared_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let mut state = self.write();
    let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) else {
      return Ok(false);
    };

    if !user.shared_posts.contains(&board_id) {
      user.shared_posts.push(board_id);
    }
    user.updated_at = Some(DateTime::now());
    Ok(true)
  }

  async fn add_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let mut state = self.write();
    let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) else {
      return Ok(false);
    };

    if !user.saved_posts.contains(&board_id) {
      user.saved_posts.push(board_id);
    }
    user.updated_at = Some(DateTime::now());
    Ok(true)
  }

  async fn remove_saved_post(
    &self,
    user_id: Id<UserMarker>,
    board_id: Id<BoardMarker>,
  ) -> database::Result<bool> {
    let mut state = self.write();
    let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) else {
      return Ok(false);
    };

    user.saved_posts.retain(|saved| *saved != board_id);
    user.updated_at = Some(DateTime::now());
    Ok(true)
  }

  async fn list_shared_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>> {
    let state = self.read();
    let Some(user) = state.users.iter().find(|user| user.id == user_id) else {
      return Ok(Page::empty());
    };

    // Appended last means shared last, so iterate backwards for a
    // newest first window.
    let ids = user.shared_posts.iter().rev().copied().collect::<Vec<_>>();
    Ok(paginate(ids, page))
  }

  async fn list_saved_posts(
    &self,
    user_id: Id<UserMarker>,
    page: PageRequest,
  ) -> database::Result<Page<Id<BoardMarker>>> {
    let state = self.read();
    let Some(user) = state.users.iter().find(|user| user.id == user_id) else {
      return Ok(Page::empty());
    };

    let ids = user.saved_posts.iter().rev().copied().collect::<Vec<_>>();
    Ok(paginate(ids, page))
  }
}

#[async_trait]
impl EventStore for MemoryStore {
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
    self.write().events.push(event.clone());
    Ok(event)
  }

  async fn find_by_id(&self, id: Id<EventMarker>) -> database::Result<Option<EventView>> {
    Ok(
      self
        .read()
        .events
        .iter()
        .find(|event| event.id == id && !event.destroyed)
        .map(|event| EventView {
          participants_count: event.participants.len() as u64,
          likes_count: event.likes.len() as u64,
          event: event.clone(),
        }),
    )
  }

  async fn list_page(&self, page: PageRequest) -> database::Result<Page<Event>> {
    let mut events = self
      .read()
      .events
      .iter()
      .filter(|event| !event.destroyed)
      .cloned()
      .collect::<Vec<_>>();

    // Soonest starting time first.
    events.sort_by(|a, b| {
      a.starts_at
        .cmp(&b.starts_at)
        .then_with(|| a.id.cmp(&b.id))
    });
    Ok(paginate(events, page))
  }

  async fn search(&self, term: &str) -> database::Result<Vec<Event>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
      return Ok(Vec::new());
    }

    let mut events = self
      .read()
      .events
      .iter()
      .filter(|event| {
        !event.destroyed
          && (matches_term(&event.title, &term)
            || matches_term(&event.description, &term)
            || event.hashtags.iter().any(|tag| matches_term(tag, &term)))
      })
      .cloned()
      .collect::<Vec<_>>();

    events.sort_by(|a, b| {
      a.starts_at
        .cmp(&b.starts_at)
        .then_with(|| a.id.cmp(&b.id))
    });
    Ok(events)
  }

  async fn update(
    &self,
    id: Id<EventMarker>,
    patch: EventPatch,
  ) -> database::Result<Option<Event>> {
    let mut state = self.write();
    let Some(event) = state
      .events
      .iter_mut()
      .find(|event| event.id == id && !event.destroyed)
    else {
      return Ok(None);
    };

    if let Some(title) = patch.title {
      event.title = title;
    }
    if let Some(description) = patch.description {
      event.hashtags = extract_hashtags(&description);
      event.description = description;
    }
    if let Some(location) = patch.location {
      event.location = location;
    }
    if let Some(starts_at) = patch.starts_at {
      event.starts_at = starts_at;
    }
    if let Some(ends_at) = patch.ends_at {
      event.ends_at = ends_at;
    }
    if let Some(images) = patch.images {
      event.images = images;
    }
    event.updated_at = Some(DateTime::now());

    Ok(Some(event.clone()))
  }

  async fn add_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>> {
    let mut state = self.write();
    let Some(event) = state
      .events
      .iter_mut()
      .find(|event| event.id == id && !event.destroyed)
    else {
      return Ok(None);
    };

    if !event.participants.contains(&user_id) {
      event.participants.push(user_id);
    }
    event.updated_at = Some(DateTime::now());
    Ok(Some(event.clone()))
  }

  async fn remove_participant(
    &self,
    id: Id<EventMarker>,
    user_id: Id<UserMarker>,
  ) -> database::Result<Option<Event>> {
    let mut state = self.write();
    let Some(event) = state
      .events
      .iter_mut()
      .find(|event| event.id == id && !event.destroyed)
    else {
      return Ok(None);
    };

    event.participants.retain(|joined| *joined != user_id);
    event.updated_at = Some(DateTime::now());
    Ok(Some(event.clone()))
  }

  async fn soft_delete(&self, id: Id<EventMarker>) -> database::Result<bool> {
    let mut state = self.write();
    let Some(event) = state
      .events
      .iter_mut()
      .find(|event| event.id == id && !event.destroyed)
    else {
      return Ok(false);
    };

    event.destroyed = true;
    event.updated_at = Some(DateTime::now());
    Ok(true)
  }
}

#[async_trait]
impl NotificationStore for MemoryStore {
  async fn insert(&self, input: NewNotification) -> database::Result<Notification> {
    let mut state = self.write();
    if input.kind == NotificationKind::Rating {
      // Keep only the latest rating entry per comment and recipient.
      state.notifications.retain(|existing| {
        existing.kind != NotificationKind::Rating
          || existing.owner_id != input.owner_id
          || existing.comment_id != input.comment_id
      });
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
    state.notifications.push(notification.clone());
    Ok(notification)
  }

  async fn list_by_owner(
    &self,
    owner_id: Id<UserMarker>,
  ) -> database::Result<Vec<Notification>> {
    let mut notifications = self
      .read()
      .notifications
      .iter()
      .filter(|notification| notification.owner_id == owner_id)
      .cloned()
      .collect::<Vec<_>>();

    notifications.sort_by(|a, b| {
      b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
    });
    Ok(notifications)
  }

  async fn count_unread(&self, owner_id: Id<UserMarker>) -> database::Result<u64> {
    Ok(
      self
        .read()
        .notifications
        .iter()
        .filter(|notification| notification.owner_id == owner_id && !notification.read)
        .count() as u64,
    )
  }

  async fn mark_all_read(&self, owner_id: Id<UserMarker>) -> database::Result<u64> {
    let mut state = self.write();
    let mut flipped = 0;
    for notification in state
      .notifications
      .iter_mut()
      .filter(|notification| notification.owner_id == owner_id && !notification.read)
    {
      notification.read = true;
      flipped += 1;
    }
    Ok(flipped)
  }
}

#[async_trait]
impl SessionStore for MemoryStore {
  async fn insert(&self, input: NewSession) -> database::Result<Session> {
    let session = Session {
      id: Id::new(),
      user_id: input.user_id,
      token_hash: input.token_hash,
      created_at: DateTime::now(),
      expires_at: input.expires_at,
    };
    self.write().sessions.push(session.clone());
    Ok(session)
  }

  async fn find_by_token_hash(&self, token_hash: &str) -> database::Result<Option<Session>> {
    // Expired sessions are as good as gone even if the reaper has
    // not removed them yet.
    let now = DateTime::now();
    Ok(
      self
        .read()
        .sessions
        .iter()
        .find(|session| session.token_hash == token_hash && session.expires_at > now)
        .cloned(),
    )
  }

  async fn delete(&self, id: Id<SessionMarker>) -> database::Result<bool> {
    let mut state = self.write();
    let before = state.sessions.len();
    state.sessions.retain(|session| session.id != id);
    Ok(state.sessions.len() != before)
  }

  async fn delete_by_token_hash(&self, token_hash: &str) -> database::Result<bool> {
    let mut state = self.write();
    let before = state.sessions.len();
    state.sessions.retain(|session| session.token_hash != token_hash);
    Ok(state.sessions.len() != before)
  }
}
