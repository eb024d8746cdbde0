use mongodb::bson::DateTime;
use thiserror::Error;
use tokio::task::spawn_blocking;
use validator::{Validate, ValidateError};

use crate::crypto;
use crate::database::ErrorExt2;
use crate::http::{Actor, Error, Jwt, Result};
use crate::schema::User;
use crate::store::{NewSession, NewUser, ReadOptions};
use crate::types::form::boards::BoardEntry;
use crate::types::form::users::{login, register};
use crate::types::id::marker::BoardMarker;
use crate::types::{Error as ErrorType, Id, Page, PageRequest};
use crate::util::text::slugify;
use crate::util::Sensitive;
use crate::App;

use super::field_error;

#[derive(Debug, Error)]
#[error("User not found")]
struct UserNotFound;

fn user_not_found() -> Error {
  Error::from_context(ErrorType::not_found("User not found"), UserNotFound)
}

/// Unknown usernames and wrong passwords are indistinguishable on
/// purpose; the response never confirms that an account exists.
fn invalid_credentials() -> Error {
  #[derive(Debug, Error)]
  #[error("Login attempt with invalid credentials")]
  struct InvalidCredentials;

  let mut error = ValidateError::msg_builder();
  error.insert("Invalid credentials");
  Error::from_context(
    ErrorType::InvalidFormBody(error.build()),
    InvalidCredentials,
  )
}

fn no_session() -> Error {
  #[derive(Debug, Error)]
  #[error("Refresh token does not match a live session")]
  struct SessionNotFound;
  Error::from_context(ErrorType::Unauthorized, SessionNotFound)
}

fn join_error(error: tokio::task::JoinError) -> Error {
  Error::from_context(ErrorType::Internal, error)
}

/// When the session is due to expire from now on.
fn session_expiry(auth: &crate::config::Auth) -> DateTime {
  let days = i64::try_from(auth.session_days.get()).unwrap_or(i64::MAX);
  let lifetime = days.saturating_mul(86_400_000);
  DateTime::from_millis(DateTime::now().timestamp_millis().saturating_add(lifetime))
}

/// Mints a fresh refresh token and persists its digest. The token
/// itself only ever exists in the response.
async fn start_session(app: &App, user: &User) -> Result<Sensitive<String>> {
  let token = crypto::generate_refresh_token();
  app
    .store
    .sessions
    .insert(NewSession {
      user_id: user.id,
      token_hash: crypto::token_digest(&token),
      expires_at: session_expiry(&app.config.auth),
    })
    .await?;
  Ok(Sensitive::new(token))
}

#[derive(Debug)]
pub struct RegisterUser {
  pub form: register::Request,
}

impl RegisterUser {
  #[tracing::instrument(skip_all, name = "services.users.register")]
  pub async fn perform(self, app: &App) -> Result<User> {
    self.form.validate()?;

    let password = self.form.password;
    let password_hash = spawn_blocking(move || crypto::hash_password(password.as_str()))
      .await
      .map_err(join_error)??;

    let name = self.form.username.as_str().trim().to_owned();
    let new_user = NewUser {
      slug: slugify(&name),
      name,
      display_name: self.form.display_name.map(|name| name.trim().to_owned()),
      email: self.form.email.map(|email| email.as_str().trim().to_owned()),
      password_hash: Sensitive::new(password_hash),
      admin: false,
    };

    match app.store.users.insert(new_user).await {
      Ok(user) => Ok(user),
      Err(report) if report.is_duplicate() => Err(Error::from_report(
        ErrorType::InvalidFormBody(field_error("username", "This username is already taken")),
        report,
      )),
      Err(report) => Err(report.into()),
    }
  }
}

#[derive(Debug)]
pub struct LoginResponse {
  pub user: User,
  pub access_token: Sensitive<String>,
  pub refresh_token: Sensitive<String>,
}

#[derive(Debug)]
pub struct LoginUser {
  pub form: login::Request,
}

impl LoginUser {
  #[tracing::instrument(skip_all, name = "services.users.login")]
  pub async fn perform(self, app: &App) -> Result<LoginResponse> {
    self.form.validate()?;

    let name = self.form.username.as_str().trim().to_owned();
    let Some(user) = app.store.users.find_by_name(&name).await? else {
      return Err(invalid_credentials());
    };

    let password = self.form.password;
    let hash = user.password_hash.clone();
    let matched =
      spawn_blocking(move || crypto::verify_password(password.as_str().as_bytes(), hash.as_str()))
        .await
        .map_err(join_error)??;
    if !matched {
      return Err(invalid_credentials());
    }

    let access_token = Jwt::issue(&user, &app.config.auth).encode(app).await?;
    let refresh_token = start_session(app, &user).await?;
    Ok(LoginResponse {
      user,
      access_token: Sensitive::new(access_token),
      refresh_token,
    })
  }
}

#[derive(Debug)]
pub struct RefreshResponse {
  pub access_token: Sensitive<String>,
  pub refresh_token: Sensitive<String>,
}

#[derive(Debug)]
pub struct RefreshSession<'a> {
  pub refresh_token: &'a str,
}

impl RefreshSession<'_> {
  /// Rotates the session: the presented token is retired before the
  /// replacement is issued, so every refresh token works once.
  #[tracing::instrument(skip_all, name = "services.users.refresh")]
  pub async fn perform(self, app: &App) -> Result<RefreshResponse> {
    let token = self.refresh_token.trim();
    if token.is_empty() {
      return Err(no_session());
    }

    let digest = crypto::token_digest(token);
    let session = app
      .store
      .sessions
      .find_by_token_hash(&digest)
      .await?
      .ok_or_else(no_session)?;
    let user = app
      .store
      .users
      .find_by_id(session.user_id)
      .await?
      .ok_or_else(no_session)?;

    app.store.sessions.delete(session.id).await?;

    let access_token = Jwt::issue(&user, &app.config.auth).encode(app).await?;
    let refresh_token = start_session(app, &user).await?;
    Ok(RefreshResponse {
      access_token: Sensitive::new(access_token),
      refresh_token,
    })
  }
}

#[derive(Debug)]
pub struct Logout<'a> {
  pub refresh_token: &'a str,
}

impl Logout<'_> {
  /// Idempotent; logging out of an already dead session succeeds.
  #[tracing::instrument(skip_all, name = "services.users.logout")]
  pub async fn perform(self, app: &App) -> Result<()> {
    let token = self.refresh_token.trim();
    if token.is_empty() {
      return Ok(());
    }
    app
      .store
      .sessions
      .delete_by_token_hash(&crypto::token_digest(token))
      .await?;
    Ok(())
  }
}

#[derive(Debug)]
pub struct GetProfile<'a> {
  pub name: &'a str,
}

impl GetProfile<'_> {
  /// `me` resolves to the caller. Usernames are at least six
  /// characters, so no account can ever collide with it.
  #[tracing::instrument(skip_all, name = "services.users.profile")]
  pub async fn perform(self, app: &App, actor: &Actor) -> Result<User> {
    #[derive(Debug, Error)]
    #[error("Anonymous caller asked for their own profile")]
    struct NotLoggedIn;

    let name = self.name.trim();
    if name == "me" {
      return match actor {
        Actor::User(user) => Ok(user.clone()),
        Actor::Anonymous => Err(Error::from_context(ErrorType::Unauthorized, NotLoggedIn)),
      };
    }
    app
      .store
      .users
      .find_by_name(name)
      .await?
      .ok_or_else(user_not_found)
  }
}

/// Swaps stored board ids for full board details, leaving a
/// tombstone wherever a board has been deleted or hidden since
/// it was recorded.
async fn hydrate_entries(app: &App, page: Page<Id<BoardMarker>>) -> Result<Page<BoardEntry>> {
  let mut items = Vec::with_capacity(page.items.len());
  for board_id in page.items {
    let entry = match app
      .store
      .boards
      .find_by_id(board_id, ReadOptions::default())
      .await?
    {
      Some(view) => BoardEntry::Live(Box::new(view.into())),
      None => BoardEntry::gone(board_id.to_hex()),
    };
    items.push(entry);
  }
  Ok(Page {
    items,
    total_count: page.total_count,
  })
}

#[derive(Debug)]
pub struct ListSharedBoards<'a> {
  pub user_id: &'a str,
  pub page: PageRequest,
}

impl ListSharedBoards<'_> {
  #[tracing::instrument(skip_all, name = "services.users.shared_boards")]
  pub async fn perform(self, app: &App) -> Result<Page<BoardEntry>> {
    let Some(user_id) = Id::parse(self.user_id.trim()) else {
      return Ok(Page::empty());
    };
    let page = app.store.users.list_shared_posts(user_id, self.page).await?;
    hydrate_entries(app, page).await
  }
}

#[derive(Debug)]
pub struct ListSavedBoards<'a> {
  pub user_id: &'a str,
  pub page: PageRequest,
}

impl ListSavedBoards<'_> {
  #[tracing::instrument(skip_all, name = "services.users.saved_boards")]
  pub async fn perform(self, app: &App) -> Result<Page<BoardEntry>> {
    let Some(user_id) = Id::parse(self.user_id.trim()) else {
      return Ok(Page::empty());
    };
    let page = app.store.users.list_saved_posts(user_id, self.page).await?;
    hydrate_entries(app, page).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::{seed_board, seed_user};

  fn register_form(name: &str) -> register::Request {
    register::Request {
      username: name.to_string().into(),
      display_name: None,
      email: None,
      password: "hunter_two_II".to_string().into(),
      confirm_password: "hunter_two_II".to_string().into(),
    }
  }

  fn login_form(name: &str, password: &str) -> login::Request {
    login::Request {
      username: name.to_string().into(),
      password: password.to_string().into(),
    }
  }

  async fn register(app: &App, name: &str) -> User {
    RegisterUser {
      form: register_form(name),
    }
    .perform(app)
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn register_then_login_round_trip() {
    let app = App::test();
    let user = register(&app, "snippeteer").await;
    assert_eq!("snippeteer", user.name);
    assert_eq!("snippeteer", user.slug);
    assert!(!user.admin);
    // Stored as an argon2 hash, never the raw password.
    assert!(user.password_hash.as_str().starts_with("$argon2"));

    let response = LoginUser {
      form: login_form("snippeteer", "hunter_two_II"),
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(user.id, response.user.id);

    let claims = Jwt::decode(response.access_token.as_str(), &app).unwrap();
    assert_eq!(user.id, claims.user_id);
    assert!(!claims.admin);
  }

  #[tokio::test]
  async fn login_failures_look_identical() {
    let app = App::test();
    register(&app, "snippeteer").await;

    let wrong_password = LoginUser {
      form: login_form("snippeteer", "not_the_password"),
    }
    .perform(&app)
    .await
    .unwrap_err();
    let unknown_user = LoginUser {
      form: login_form("nobody_here", "hunter_two_II"),
    }
    .perform(&app)
    .await
    .unwrap_err();

    assert_eq!(wrong_password.as_type(), unknown_user.as_type());
    assert!(matches!(
      wrong_password.as_type(),
      ErrorType::InvalidFormBody(..)
    ));
  }

  #[tokio::test]
  async fn duplicate_username_is_a_field_error() {
    let app = App::test();
    register(&app, "snippeteer").await;

    let error = RegisterUser {
      form: register_form("snippeteer"),
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::InvalidFormBody(..)));
  }

  #[tokio::test]
  async fn refresh_rotates_the_session() {
    let app = App::test();
    register(&app, "snippeteer").await;
    let login = LoginUser {
      form: login_form("snippeteer", "hunter_two_II"),
    }
    .perform(&app)
    .await
    .unwrap();

    let rotated = RefreshSession {
      refresh_token: login.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap();
    assert_ne!(login.refresh_token.as_str(), rotated.refresh_token.as_str());

    // The presented token died with the rotation.
    let error = RefreshSession {
      refresh_token: login.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Unauthorized));

    RefreshSession {
      refresh_token: rotated.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap();
  }

  #[tokio::test]
  async fn logout_kills_the_session_and_is_idempotent() {
    let app = App::test();
    register(&app, "snippeteer").await;
    let login = LoginUser {
      form: login_form("snippeteer", "hunter_two_II"),
    }
    .perform(&app)
    .await
    .unwrap();

    Logout {
      refresh_token: login.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap();
    Logout {
      refresh_token: login.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap();

    let error = RefreshSession {
      refresh_token: login.refresh_token.as_str(),
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Unauthorized));
  }

  #[tokio::test]
  async fn garbage_refresh_tokens_are_unauthorized() {
    let app = App::test();
    let error = RefreshSession {
      refresh_token: "never-issued",
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Unauthorized));
  }

  #[tokio::test]
  async fn profile_resolves_me_and_names() {
    let app = App::test();
    let user = seed_user(&app, "camille").await;

    let error = GetProfile { name: "me" }
      .perform(&app, &Actor::Anonymous)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Unauthorized));

    let me = GetProfile { name: "me" }
      .perform(&app, &Actor::User(user.clone()))
      .await
      .unwrap();
    assert_eq!(user.id, me.id);

    let by_name = GetProfile { name: "camille" }
      .perform(&app, &Actor::Anonymous)
      .await
      .unwrap();
    assert_eq!(user.id, by_name.id);

    let error = GetProfile { name: "somebody" }
      .perform(&app, &Actor::Anonymous)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::NotFound { .. }));
  }

  #[tokio::test]
  async fn shared_listing_leaves_tombstones_for_deleted_boards() {
    let app = App::test();
    let author = seed_user(&app, "camille").await;
    let reader = seed_user(&app, "readerly").await;
    let kept = seed_board(&app, &author).await;
    let doomed = seed_board(&app, &author).await;

    for board in [&kept, &doomed] {
      app.store.boards.add_share(board.id, reader.id).await.unwrap();
      app
        .store
        .users
        .add_shared_post(reader.id, board.id)
        .await
        .unwrap();
    }
    app.store.boards.delete(doomed.id).await.unwrap();

    let hex = reader.id.to_hex();
    let page = ListSharedBoards {
      user_id: &hex,
      page: PageRequest::default(),
    }
    .perform(&app)
    .await
    .unwrap();

    assert_eq!(2, page.total_count);
    let gone: Vec<_> = page
      .items
      .iter()
      .filter(|entry| matches!(entry, BoardEntry::Gone { .. }))
      .collect();
    assert_eq!(1, gone.len());
    assert!(matches!(
      gone[0],
      BoardEntry::Gone { id, deleted: true } if *id == doomed.id.to_hex()
    ));
  }

  #[tokio::test]
  async fn saved_listing_tolerates_garbage_ids() {
    let app = App::test();
    let page = ListSavedBoards {
      user_id: "garbage",
      page: PageRequest::default(),
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(0, page.total_count);
  }
}
