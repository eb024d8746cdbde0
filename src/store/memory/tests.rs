use mongodb::bson::DateTime;

use crate::database::ErrorExt2;
use crate::schema::{Board, NotificationKind, VoteDirection};
use crate::store::{
  BoardPatch, NewBoard, NewComment, NewEvent, NewNotification, NewSession, NewUser, ReadOptions,
  Store,
};
use crate::types::id::marker::{BoardMarker, CommentMarker, UserMarker};
use crate::types::{Id, PageRequest};
use crate::util::Sensitive;

fn board_input(author_id: Id<UserMarker>) -> NewBoard {
  NewBoard {
    author_id,
    title: "Hello World".into(),
    description: "desc text".into(),
    language: "rust".into(),
    content: "content #demo".into(),
    images: Vec::new(),
    video: None,
  }
}

async fn approved_board(store: &Store, author_id: Id<UserMarker>) -> Board {
  let board = store.boards.create(board_input(author_id)).await.unwrap();
  store
    .boards
    .set_moderation(board.id, false)
    .await
    .unwrap()
    .unwrap()
}

fn comment_input(board_id: Id<BoardMarker>, author_id: Id<UserMarker>) -> NewComment {
  NewComment {
    board_id,
    parent_id: None,
    author_id,
    username: "reviewer".into(),
    content: "looks good".into(),
  }
}

fn user_input(name: &str) -> NewUser {
  NewUser {
    name: name.into(),
    display_name: None,
    email: None,
    password_hash: Sensitive::new("$argon2id$stub".into()),
    admin: false,
    slug: name.into(),
  }
}

fn in_millis(offset: i64) -> DateTime {
  DateTime::from_millis(DateTime::now().timestamp_millis() + offset)
}

#[tokio::test]
async fn new_boards_start_pending_with_derived_hashtags() {
  let store = Store::memory();
  let board = store.boards.create(board_input(Id::new())).await.unwrap();

  assert_eq!(vec!["#demo".to_string()], board.hashtags);
  assert!(board.is_pending);
  assert!(board.likes.is_empty());
  assert!(board.shared_with.is_empty());
  assert!(board.updated_at.is_none());

  let hidden = store
    .boards
    .find_by_id(board.id, ReadOptions::default())
    .await
    .unwrap();
  assert!(hidden.is_none());

  let visible = store
    .boards
    .find_by_id(board.id, ReadOptions::moderation_inclusive())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(board.id, visible.board.id);
  assert_eq!(0, visible.comments_count);
  assert_eq!(0, visible.likes_count);
}

#[tokio::test]
async fn approving_publishes_the_board() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  assert!(!board.is_pending);

  let page = store
    .boards
    .list_page(PageRequest::default(), ReadOptions::default())
    .await
    .unwrap();
  assert_eq!(1, page.total_count);
  assert!(page.items.iter().any(|item| item.id == board.id));

  let inclusive = store
    .boards
    .list_page(PageRequest::default(), ReadOptions::moderation_inclusive())
    .await
    .unwrap();
  assert!(inclusive.items.iter().any(|item| item.id == board.id));
}

#[tokio::test]
async fn like_toggle_is_an_involution() {
  let store = Store::memory();
  let user = Id::new();
  let board = approved_board(&store, Id::new()).await;

  let liked = store
    .boards
    .toggle_like(board.id, user)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(vec![user], liked.likes);

  let unliked = store
    .boards
    .toggle_like(board.id, user)
    .await
    .unwrap()
    .unwrap();
  assert!(unliked.likes.is_empty());
  assert_eq!(board.title, unliked.title);

  let missing = store.boards.toggle_like(Id::new(), user).await.unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn sharing_is_idempotent_and_monotonic() {
  let store = Store::memory();
  let user = Id::new();
  let board = approved_board(&store, Id::new()).await;

  assert!(store.boards.add_share(board.id, user).await.unwrap());
  assert!(store.boards.add_share(board.id, user).await.unwrap());

  let view = store
    .boards
    .find_by_id(board.id, ReadOptions::default())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(vec![user], view.board.shared_with);

  assert!(!store.boards.add_share(Id::new(), user).await.unwrap());
}

#[tokio::test]
async fn search_ignores_blank_terms() {
  let store = Store::memory();
  approved_board(&store, Id::new()).await;

  let opts = ReadOptions::default();
  assert!(store.boards.search("", opts).await.unwrap().is_empty());
  assert!(store.boards.search("   ", opts).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_matches_text_and_hashtags_case_insensitively() {
  let store = Store::memory();
  let mut input = board_input(Id::new());
  input.content = "first troop meetup #Scout".into();
  let board = store.boards.create(input).await.unwrap();
  store.boards.set_moderation(board.id, false).await.unwrap();

  let opts = ReadOptions::default();
  assert_eq!(1, store.boards.search("scout", opts).await.unwrap().len());
  assert_eq!(1, store.boards.search("TROOP", opts).await.unwrap().len());
  assert!(store
    .boards
    .search("nothing-here", opts)
    .await
    .unwrap()
    .is_empty());
}

#[tokio::test]
async fn search_hides_pending_boards_by_default() {
  let store = Store::memory();
  store.boards.create(board_input(Id::new())).await.unwrap();

  let public = store
    .boards
    .search("demo", ReadOptions::default())
    .await
    .unwrap();
  assert!(public.is_empty());

  let inclusive = store
    .boards
    .search("demo", ReadOptions::moderation_inclusive())
    .await
    .unwrap();
  assert_eq!(1, inclusive.len());
}

#[tokio::test]
async fn hashtag_listing_accepts_bare_and_prefixed_tags() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;

  for tag in ["demo", "#demo", "DEMO"] {
    let page = store
      .boards
      .list_by_hashtag(tag, PageRequest::default(), ReadOptions::default())
      .await
      .unwrap();
    let ids = page.items.iter().map(|item| item.id).collect::<Vec<_>>();
    assert_eq!(vec![board.id], ids, "tag: {tag}");
  }

  // Element equality, not substring containment.
  let none = store
    .boards
    .list_by_hashtag("demos", PageRequest::default(), ReadOptions::default())
    .await
    .unwrap();
  assert!(none.items.is_empty());
}

#[tokio::test]
async fn pagination_windows_cover_the_set_exactly_once() {
  let store = Store::memory();
  for _ in 0..7 {
    approved_board(&store, Id::new()).await;
  }

  let mut seen = Vec::new();
  for page in 1..=3 {
    let result = store
      .boards
      .list_page(PageRequest::new(page, 3), ReadOptions::default())
      .await
      .unwrap();
    assert_eq!(7, result.total_count);
    seen.extend(result.items.into_iter().map(|item| item.id));
  }

  assert_eq!(7, seen.len());
  seen.sort();
  seen.dedup();
  assert_eq!(7, seen.len());

  let past_the_end = store
    .boards
    .list_page(PageRequest::new(4, 3), ReadOptions::default())
    .await
    .unwrap();
  assert!(past_the_end.items.is_empty());
  assert_eq!(7, past_the_end.total_count);
}

#[tokio::test]
async fn listing_is_newest_first() {
  let store = Store::memory();
  let first = approved_board(&store, Id::new()).await;
  let second = approved_board(&store, Id::new()).await;
  let third = approved_board(&store, Id::new()).await;

  let page = store
    .boards
    .list_page(PageRequest::default(), ReadOptions::default())
    .await
    .unwrap();
  let ids = page.items.iter().map(|item| item.id).collect::<Vec<_>>();
  assert_eq!(vec![third.id, second.id, first.id], ids);
}

#[tokio::test]
async fn author_listing_filters_by_owner() {
  let store = Store::memory();
  let author = Id::new();
  let board = approved_board(&store, author).await;
  approved_board(&store, Id::new()).await;

  let page = store
    .boards
    .list_by_author(author, PageRequest::default(), ReadOptions::default())
    .await
    .unwrap();
  let ids = page.items.iter().map(|item| item.id).collect::<Vec<_>>();
  assert_eq!(vec![board.id], ids);
}

#[tokio::test]
async fn updates_recompute_hashtags_only_from_content() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;

  let renamed = store
    .boards
    .update(
      board.id,
      BoardPatch {
        title: Some("Renamed".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!("Renamed", renamed.title);
  assert_eq!(board.hashtags, renamed.hashtags);
  assert!(renamed.updated_at.is_some());

  let rewritten = store
    .boards
    .update(
      board.id,
      BoardPatch {
        content: Some("now about #rustlang".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(vec!["#rustlang".to_string()], rewritten.hashtags);

  let missing = store
    .boards
    .update(Id::new(), BoardPatch::default())
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn deleting_reports_whether_anything_was_removed() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;

  assert!(store.boards.delete(board.id).await.unwrap());
  assert!(!store.boards.delete(board.id).await.unwrap());

  let gone = store
    .boards
    .find_by_id(board.id, ReadOptions::moderation_inclusive())
    .await
    .unwrap();
  assert!(gone.is_none());
}

#[tokio::test]
async fn board_view_counts_live_comments() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();
  let second = store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();

  let view = store
    .boards
    .find_by_id(board.id, ReadOptions::default())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(2, view.comments_count);

  store.comments.delete(second.id).await.unwrap();
  let view = store
    .boards
    .find_by_id(board.id, ReadOptions::default())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(1, view.comments_count);
}

#[tokio::test]
async fn voting_twice_in_the_same_direction_retracts() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  let comment = store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();
  let voter = Id::new();

  let voted = store
    .comments
    .vote(comment.id, voter, VoteDirection::Up)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(1, voted.upvotes);
  assert_eq!(0, voted.downvotes);
  assert_eq!(1, voted.votes.len());

  let retracted = store
    .comments
    .vote(comment.id, voter, VoteDirection::Up)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(0, retracted.upvotes);
  assert!(retracted.votes.is_empty());
}

#[tokio::test]
async fn voting_the_opposite_direction_flips() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  let comment = store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();
  let voter = Id::new();

  store
    .comments
    .vote(comment.id, voter, VoteDirection::Up)
    .await
    .unwrap();
  let flipped = store
    .comments
    .vote(comment.id, voter, VoteDirection::Down)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(0, flipped.upvotes);
  assert_eq!(1, flipped.downvotes);
  assert_eq!(1, flipped.votes.len());
  assert_eq!(VoteDirection::Down, flipped.votes[0].direction);

  let other_voter = Id::new();
  let tallied = store
    .comments
    .vote(comment.id, other_voter, VoteDirection::Up)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(1, tallied.upvotes);
  assert_eq!(1, tallied.downvotes);
}

#[tokio::test]
async fn comment_listing_is_scoped_and_newest_first() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  let other = approved_board(&store, Id::new()).await;

  let first = store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();
  let second = store
    .comments
    .create(comment_input(board.id, Id::new()))
    .await
    .unwrap();
  store
    .comments
    .create(comment_input(other.id, Id::new()))
    .await
    .unwrap();

  let page = store
    .comments
    .list_by_board(board.id, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(2, page.total_count);
  let ids = page.items.iter().map(|item| item.id).collect::<Vec<_>>();
  assert_eq!(vec![second.id, first.id], ids);
}

#[tokio::test]
async fn delete_by_board_removes_every_comment() {
  let store = Store::memory();
  let board = approved_board(&store, Id::new()).await;
  let other = approved_board(&store, Id::new()).await;

  for _ in 0..3 {
    store
      .comments
      .create(comment_input(board.id, Id::new()))
      .await
      .unwrap();
  }
  let kept = store
    .comments
    .create(comment_input(other.id, Id::new()))
    .await
    .unwrap();

  assert_eq!(3, store.comments.delete_by_board(board.id).await.unwrap());
  let emptied = store
    .comments
    .list_by_board(board.id, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(0, emptied.total_count);

  let untouched = store.comments.find_by_id(kept.id).await.unwrap();
  assert!(untouched.is_some());
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
  let store = Store::memory();
  store.users.insert(user_input("ferris")).await.unwrap();

  let error = store.users.insert(user_input("ferris")).await.unwrap_err();
  assert!(error.is_duplicate());

  let other = store.users.insert(user_input("corro")).await.unwrap();
  assert_eq!("corro", other.name);
}

#[tokio::test]
async fn saved_posts_support_add_remove_and_windows() {
  let store = Store::memory();
  let user = store.users.insert(user_input("saver")).await.unwrap();

  let mut boards = Vec::new();
  for _ in 0..4 {
    boards.push(approved_board(&store, Id::new()).await);
  }
  for board in &boards {
    assert!(store.users.add_saved_post(user.id, board.id).await.unwrap());
  }
  // Saving again is a no-op.
  assert!(store
    .users
    .add_saved_post(user.id, boards[0].id)
    .await
    .unwrap());

  let window = store
    .users
    .list_saved_posts(user.id, PageRequest::new(1, 3))
    .await
    .unwrap();
  assert_eq!(4, window.total_count);
  assert_eq!(
    vec![boards[3].id, boards[2].id, boards[1].id],
    window.items
  );

  assert!(store
    .users
    .remove_saved_post(user.id, boards[3].id)
    .await
    .unwrap());
  let shrunk = store
    .users
    .list_saved_posts(user.id, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(3, shrunk.total_count);

  assert!(!store
    .users
    .add_saved_post(Id::new(), boards[0].id)
    .await
    .unwrap());
}

#[tokio::test]
async fn shared_posts_record_once_per_board() {
  let store = Store::memory();
  let user = store.users.insert(user_input("sharer")).await.unwrap();
  let board = approved_board(&store, Id::new()).await;

  assert!(store.users.add_shared_post(user.id, board.id).await.unwrap());
  assert!(store.users.add_shared_post(user.id, board.id).await.unwrap());

  let window = store
    .users
    .list_shared_posts(user.id, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(vec![board.id], window.items);
  assert_eq!(1, window.total_count);
}

fn notification_input(
  owner_id: Id<UserMarker>,
  comment_id: Option<Id<CommentMarker>>,
  kind: NotificationKind,
  message: &str,
) -> NewNotification {
  NewNotification {
    owner_id,
    actor_name: "somebody".into(),
    kind,
    board_id: Id::new(),
    comment_id,
    message: message.into(),
  }
}

#[tokio::test]
async fn rating_notifications_collapse_per_comment_and_recipient() {
  let store = Store::memory();
  let owner = Id::new();
  let comment = Id::new();

  store
    .notifications
    .insert(notification_input(
      owner,
      Some(comment),
      NotificationKind::Rating,
      "upvoted",
    ))
    .await
    .unwrap();
  store
    .notifications
    .insert(notification_input(
      owner,
      Some(comment),
      NotificationKind::Rating,
      "downvoted",
    ))
    .await
    .unwrap();

  let listed = store.notifications.list_by_owner(owner).await.unwrap();
  assert_eq!(1, listed.len());
  assert_eq!("downvoted", listed[0].message);

  // Comment notifications pile up normally.
  store
    .notifications
    .insert(notification_input(
      owner,
      None,
      NotificationKind::Comment,
      "replied",
    ))
    .await
    .unwrap();
  store
    .notifications
    .insert(notification_input(
      owner,
      None,
      NotificationKind::Comment,
      "replied again",
    ))
    .await
    .unwrap();
  let listed = store.notifications.list_by_owner(owner).await.unwrap();
  assert_eq!(3, listed.len());
}

#[tokio::test]
async fn mark_all_read_flips_only_the_owners_unread() {
  let store = Store::memory();
  let owner = Id::new();
  let bystander = Id::new();

  for message in ["one", "two"] {
    store
      .notifications
      .insert(notification_input(
        owner,
        None,
        NotificationKind::Comment,
        message,
      ))
      .await
      .unwrap();
  }
  store
    .notifications
    .insert(notification_input(
      bystander,
      None,
      NotificationKind::Comment,
      "other",
    ))
    .await
    .unwrap();

  assert_eq!(2, store.notifications.count_unread(owner).await.unwrap());
  assert_eq!(2, store.notifications.mark_all_read(owner).await.unwrap());
  assert_eq!(0, store.notifications.count_unread(owner).await.unwrap());
  assert_eq!(0, store.notifications.mark_all_read(owner).await.unwrap());
  assert_eq!(1, store.notifications.count_unread(bystander).await.unwrap());
}

#[tokio::test]
async fn expired_sessions_are_invisible() {
  let store = Store::memory();
  let user = Id::new();

  store
    .sessions
    .insert(NewSession {
      user_id: user,
      token_hash: "stale".into(),
      expires_at: in_millis(-1_000),
    })
    .await
    .unwrap();
  store
    .sessions
    .insert(NewSession {
      user_id: user,
      token_hash: "fresh".into(),
      expires_at: in_millis(60_000),
    })
    .await
    .unwrap();

  assert!(store
    .sessions
    .find_by_token_hash("stale")
    .await
    .unwrap()
    .is_none());
  let found = store
    .sessions
    .find_by_token_hash("fresh")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(user, found.user_id);

  assert!(store.sessions.delete_by_token_hash("fresh").await.unwrap());
  assert!(!store.sessions.delete_by_token_hash("fresh").await.unwrap());
}

fn event_input(created_by: Id<UserMarker>, starts_in: i64) -> NewEvent {
  NewEvent {
    created_by,
    title: "Monthly meetup".into(),
    description: "Kick off with #rustlang talks".into(),
    location: "Berlin".into(),
    starts_at: in_millis(starts_in),
    ends_at: in_millis(starts_in + 3_600_000),
    images: Vec::new(),
  }
}

#[tokio::test]
async fn events_list_soonest_first_and_soft_delete_hides() {
  let store = Store::memory();
  let later = store.events.create(event_input(Id::new(), 120_000)).await.unwrap();
  let sooner = store.events.create(event_input(Id::new(), 30_000)).await.unwrap();

  assert_eq!(vec!["#rustlang".to_string()], sooner.hashtags);

  let page = store.events.list_page(PageRequest::default()).await.unwrap();
  let ids = page.items.iter().map(|item| item.id).collect::<Vec<_>>();
  assert_eq!(vec![sooner.id, later.id], ids);

  assert!(store.events.soft_delete(later.id).await.unwrap());
  assert!(!store.events.soft_delete(later.id).await.unwrap());

  let page = store.events.list_page(PageRequest::default()).await.unwrap();
  assert_eq!(1, page.total_count);
  assert!(store.events.find_by_id(later.id).await.unwrap().is_none());
}

#[tokio::test]
async fn event_participation_is_a_set() {
  let store = Store::memory();
  let event = store.events.create(event_input(Id::new(), 60_000)).await.unwrap();
  let joiner = Id::new();

  store.events.add_participant(event.id, joiner).await.unwrap();
  let joined = store
    .events
    .add_participant(event.id, joiner)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(vec![joiner], joined.participants);

  let view = store.events.find_by_id(event.id).await.unwrap().unwrap();
  assert_eq!(1, view.participants_count);

  let left = store
    .events
    .remove_participant(event.id, joiner)
    .await
    .unwrap()
    .unwrap();
  assert!(left.participants.is_empty());
}
