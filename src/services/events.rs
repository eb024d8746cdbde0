use mongodb::bson::DateTime;
use thiserror::Error;
use validator::Validate;

use crate::http::{Error, Result};
use crate::schema::{Event, EventView, User};
use crate::store::{EventPatch, NewEvent};
use crate::types::form::events::{create, update};
use crate::types::id::marker::EventMarker;
use crate::types::{Error as ErrorType, Id, Page, PageRequest};
use crate::App;

use super::{field_error, parse_id, require_admin};

#[derive(Debug, Error)]
#[error("Event not found")]
struct EventNotFound;

fn event_not_found() -> Error {
  Error::from_context(ErrorType::not_found("Event not found"), EventNotFound)
}

#[derive(Debug)]
pub struct CreateEvent {
  pub form: create::Request,
}

impl CreateEvent {
  /// Events are curated; only admins schedule them. Hashtags come
  /// from the description, unlike boards where they come from the
  /// snippet content.
  #[tracing::instrument(skip_all, name = "services.events.create")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Event> {
    require_admin(user)?;
    self.form.validate()?;

    let event = app
      .store
      .events
      .create(NewEvent {
        created_by: user.id,
        title: self.form.title,
        description: self.form.description,
        location: self.form.location,
        starts_at: DateTime::from_chrono(self.form.starts_at),
        ends_at: DateTime::from_chrono(self.form.ends_at),
        images: self.form.images,
      })
      .await?;

    Ok(event)
  }
}

#[derive(Debug)]
pub struct GetEvent<'a> {
  pub id: &'a str,
}

impl GetEvent<'_> {
  #[tracing::instrument(skip_all, name = "services.events.get")]
  pub async fn perform(self, app: &App) -> Result<EventView> {
    let event = match Id::parse(self.id.trim()) {
      Some(id) => app.store.events.find_by_id(id).await?,
      None => None,
    };
    event.ok_or_else(event_not_found)
  }
}

#[derive(Debug)]
pub struct ListEvents {
  pub page: PageRequest,
}

impl ListEvents {
  #[tracing::instrument(skip_all, name = "services.events.list")]
  pub async fn perform(self, app: &App) -> Result<Page<Event>> {
    Ok(app.store.events.list_page(self.page).await?)
  }
}

#[derive(Debug)]
pub struct SearchEvents<'a> {
  pub term: &'a str,
}

impl SearchEvents<'_> {
  #[tracing::instrument(skip_all, name = "services.events.search")]
  pub async fn perform(self, app: &App) -> Result<Vec<Event>> {
    Ok(app.store.events.search(self.term).await?)
  }
}

#[derive(Debug)]
pub struct UpdateEvent<'a> {
  pub id: &'a str,
  pub form: update::Request,
}

impl UpdateEvent<'_> {
  #[tracing::instrument(skip_all, name = "services.events.update")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Event> {
    require_admin(user)?;
    self.form.validate()?;
    let id = parse_id::<EventMarker>("id", self.id)?;

    let patch = EventPatch {
      title: self.form.title,
      description: self.form.description,
      location: self.form.location,
      starts_at: self.form.starts_at.map(DateTime::from_chrono),
      ends_at: self.form.ends_at.map(DateTime::from_chrono),
      images: self.form.images,
    };

    app
      .store
      .events
      .update(id, patch)
      .await?
      .ok_or_else(event_not_found)
  }
}

#[derive(Debug)]
pub struct JoinEvent<'a> {
  pub id: &'a str,
}

impl JoinEvent<'_> {
  /// Idempotent set-add; joining twice leaves one entry.
  #[tracing::instrument(skip_all, name = "services.events.join")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Event> {
    let id = parse_id::<EventMarker>("id", self.id)?;

    app
      .store
      .events
      .add_participant(id, user.id)
      .await?
      .ok_or_else(event_not_found)
  }
}

#[derive(Debug)]
pub struct LeaveEvent<'a> {
  pub id: &'a str,
}

impl LeaveEvent<'_> {
  /// Leaving an event never joined is still a success.
  #[tracing::instrument(skip_all, name = "services.events.leave")]
  pub async fn perform(self, app: &App, user: &User) -> Result<Event> {
    let id = parse_id::<EventMarker>("id", self.id)?;

    app
      .store
      .events
      .remove_participant(id, user.id)
      .await?
      .ok_or_else(event_not_found)
  }
}

#[derive(Debug)]
pub struct DeleteEvent<'a> {
  pub id: &'a str,
}

impl DeleteEvent<'_> {
  /// Soft delete; the document stays behind for audit but drops out
  /// of every read path.
  #[tracing::instrument(skip_all, name = "services.events.delete")]
  pub async fn perform(self, app: &App, user: &User) -> Result<()> {
    require_admin(user)?;
    let id = parse_id::<EventMarker>("id", self.id)?;

    if !app.store.events.soft_delete(id).await? {
      return Err(field_error("id", "Nothing to delete").into());
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::{seed_admin, seed_user};
  use chrono::{Duration, TimeZone, Utc};

  fn event_form(title: &str, offset_hours: i64) -> create::Request {
    let starts_at = Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap() + Duration::hours(offset_hours);
    create::Request {
      title: title.into(),
      description: "Talks about #rustlang and #tokio".into(),
      location: "Berlin".into(),
      starts_at,
      ends_at: starts_at + Duration::hours(2),
      images: Vec::new(),
    }
  }

  async fn seed_event(app: &App, admin: &User, title: &str, offset_hours: i64) -> Event {
    CreateEvent {
      form: event_form(title, offset_hours),
    }
    .perform(app, admin)
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn scheduling_needs_an_admin() {
    let app = App::test();
    let user = seed_user(&app, "camille").await;
    let admin = seed_admin(&app, "moderator").await;

    let error = CreateEvent {
      form: event_form("Meetup", 0),
    }
    .perform(&app, &user)
    .await
    .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Forbidden));

    let event = seed_event(&app, &admin, "Meetup", 0).await;
    assert_eq!(vec!["#rustlang", "#tokio"], event.hashtags);
    assert!(!event.destroyed);
  }

  #[tokio::test]
  async fn listing_runs_soonest_first() {
    let app = App::test();
    let admin = seed_admin(&app, "moderator").await;
    let later = seed_event(&app, &admin, "Later", 48).await;
    let sooner = seed_event(&app, &admin, "Sooner", 0).await;

    let page = ListEvents {
      page: PageRequest::default(),
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(
      vec![sooner.id, later.id],
      page.items.iter().map(|event| event.id).collect::<Vec<_>>()
    );
  }

  #[tokio::test]
  async fn updating_the_description_recomputes_hashtags() {
    let app = App::test();
    let admin = seed_admin(&app, "moderator").await;
    let event = seed_event(&app, &admin, "Meetup", 0).await;
    let hex = event.id.to_hex();

    let updated = UpdateEvent {
      id: &hex,
      form: update::Request {
        description: Some("All about #actix now".into()),
        ..Default::default()
      },
    }
    .perform(&app, &admin)
    .await
    .unwrap();
    assert_eq!(vec!["#actix"], updated.hashtags);
  }

  #[tokio::test]
  async fn joining_and_leaving_are_idempotent() {
    let app = App::test();
    let admin = seed_admin(&app, "moderator").await;
    let guest = seed_user(&app, "camille").await;
    let event = seed_event(&app, &admin, "Meetup", 0).await;
    let hex = event.id.to_hex();

    JoinEvent { id: &hex }.perform(&app, &guest).await.unwrap();
    let joined = JoinEvent { id: &hex }.perform(&app, &guest).await.unwrap();
    assert_eq!(vec![guest.id], joined.participants);

    let view = GetEvent { id: &hex }.perform(&app).await.unwrap();
    assert_eq!(1, view.participants_count);

    LeaveEvent { id: &hex }.perform(&app, &guest).await.unwrap();
    let left = LeaveEvent { id: &hex }.perform(&app, &guest).await.unwrap();
    assert!(left.participants.is_empty());
  }

  #[tokio::test]
  async fn soft_deleted_events_drop_out_of_reads() {
    let app = App::test();
    let admin = seed_admin(&app, "moderator").await;
    let guest = seed_user(&app, "camille").await;
    let event = seed_event(&app, &admin, "Meetup", 0).await;
    let hex = event.id.to_hex();

    let error = DeleteEvent { id: &hex }
      .perform(&app, &guest)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::Forbidden));

    DeleteEvent { id: &hex }.perform(&app, &admin).await.unwrap();

    let error = GetEvent { id: &hex }.perform(&app).await.unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::NotFound { .. }));
    let page = ListEvents {
      page: PageRequest::default(),
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(0, page.total_count);

    // Double delete has nothing left to touch.
    let error = DeleteEvent { id: &hex }
      .perform(&app, &admin)
      .await
      .unwrap_err();
    assert!(matches!(error.as_type(), ErrorType::InvalidFormBody(..)));
  }

  #[tokio::test]
  async fn search_spans_titles_and_hashtags() {
    let app = App::test();
    let admin = seed_admin(&app, "moderator").await;
    seed_event(&app, &admin, "Monthly meetup", 0).await;

    let hits = SearchEvents { term: "monthly" }.perform(&app).await.unwrap();
    assert_eq!(1, hits.len());
    let hits = SearchEvents { term: "rustlang" }.perform(&app).await.unwrap();
    assert_eq!(1, hits.len());
    let hits = SearchEvents { term: "   " }.perform(&app).await.unwrap();
    assert!(hits.is_empty());
  }
}
