use actix_web::{
  cookie::{time::Duration, Cookie, SameSite},
  web::{self, Json},
  HttpRequest, HttpResponse,
};

use super::PageQuery;
use crate::http::{Actor, Error};
use crate::services::users as services;
use crate::types::form::users::{login, refresh, register, UserData};
use crate::types::form::Paginated;
use crate::util::Sensitive;
use crate::App;

/// Cookie mirror of the refresh token, for browser clients with
/// nowhere safer to keep it.
const REFRESH_COOKIE: &str = "snipboard_refresh";

/// The shared-posts strip is windowed three at a time.
const SHARED_PAGE_SIZE: u32 = 3;

fn refresh_cookie(app: &App, token: &str) -> Cookie<'static> {
  let days = i64::try_from(app.config.auth.session_days.get()).unwrap_or(i64::MAX);
  Cookie::build(REFRESH_COOKIE, token.to_owned())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Strict)
    .max_age(Duration::seconds(days.saturating_mul(86_400)))
    .finish()
}

fn removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::new(REFRESH_COOKIE, "");
  cookie.set_path("/");
  cookie.make_removal();
  cookie
}

/// The body wins over the cookie when both carry a token.
fn presented_token(req: &HttpRequest, form: Option<Json<refresh::Request>>) -> String {
  form
    .and_then(|json| json.into_inner().refresh_token)
    .map(Sensitive::into_inner)
    .or_else(|| {
      req
        .cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
    })
    .unwrap_or_default()
}

#[tracing::instrument]
pub async fn register(
  app: web::Data<App>,
  form: Json<register::Request>,
) -> Result<HttpResponse, Error> {
  let user = services::RegisterUser {
    form: form.into_inner(),
  }
  .perform(&app)
  .await?;
  Ok(HttpResponse::Created().json(register::Response { user: user.into() }))
}

#[tracing::instrument]
pub async fn login(
  app: web::Data<App>,
  form: Json<login::Request>,
) -> Result<HttpResponse, Error> {
  let response = services::LoginUser {
    form: form.into_inner(),
  }
  .perform(&app)
  .await?;

  let cookie = refresh_cookie(&app, response.refresh_token.as_str());
  Ok(HttpResponse::Ok().cookie(cookie).json(login::Response {
    user: response.user.into(),
    access_token: response.access_token,
    refresh_token: response.refresh_token,
  }))
}

#[tracing::instrument]
pub async fn refresh(
  app: web::Data<App>,
  req: HttpRequest,
  form: Option<Json<refresh::Request>>,
) -> Result<HttpResponse, Error> {
  let token = presented_token(&req, form);
  let response = services::RefreshSession {
    refresh_token: &token,
  }
  .perform(&app)
  .await?;

  let cookie = refresh_cookie(&app, response.refresh_token.as_str());
  Ok(HttpResponse::Ok().cookie(cookie).json(refresh::Response {
    access_token: response.access_token,
    refresh_token: response.refresh_token,
  }))
}

#[tracing::instrument]
pub async fn logout(
  app: web::Data<App>,
  actor: Actor,
  req: HttpRequest,
  form: Option<Json<refresh::Request>>,
) -> Result<HttpResponse, Error> {
  actor.get_user()?;
  let token = presented_token(&req, form);
  services::Logout {
    refresh_token: &token,
  }
  .perform(&app)
  .await?;
  Ok(HttpResponse::NoContent().cookie(removal_cookie()).finish())
}

#[tracing::instrument]
pub async fn profile(
  app: web::Data<App>,
  actor: Actor,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let user = services::GetProfile {
    name: path.as_str(),
  }
  .perform(&app, &actor)
  .await?;
  Ok(HttpResponse::Ok().json(UserData::from(user)))
}

#[tracing::instrument]
pub async fn shared(
  app: web::Data<App>,
  path: web::Path<String>,
  page: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request_with_size(SHARED_PAGE_SIZE);
  let page = services::ListSharedBoards {
    user_id: path.as_str(),
    page: request,
  }
  .perform(&app)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page, request)))
}

#[tracing::instrument]
pub async fn saved(
  app: web::Data<App>,
  path: web::Path<String>,
  page: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
  let request = page.request();
  let page = services::ListSavedBoards {
    user_id: path.as_str(),
    page: request,
  }
  .perform(&app)
  .await?;
  Ok(HttpResponse::Ok().json(Paginated::new(page, request)))
}
