use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::extras::validate_url;
use validator::{HasLength, Validate, ValidateError};

use crate::types::validation::{LOCATION_MAX_LEN, TITLE_MAX_LEN};

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub title: String,
  pub description: String,
  pub location: String,
  pub starts_at: DateTime<Utc>,
  pub ends_at: DateTime<Utc>,
  #[serde(default)]
  pub images: Vec<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("title", {
      let mut error = ValidateError::msg_builder();
      if self.title.trim().is_empty() {
        error.insert("Title is required");
      } else if self.title.length() > TITLE_MAX_LEN {
        error.insert("Title is too long");
      }
      error.build()
    });
    fields.insert("description", {
      let mut error = ValidateError::msg_builder();
      if self.description.trim().is_empty() {
        error.insert("Description is required");
      }
      error.build()
    });
    fields.insert("location", {
      let mut error = ValidateError::msg_builder();
      if self.location.trim().is_empty() {
        error.insert("Location is required");
      } else if self.location.length() > LOCATION_MAX_LEN {
        error.insert("Location is too long");
      }
      error.build()
    });
    fields.insert("ends_at", {
      let mut error = ValidateError::msg_builder();
      if self.ends_at <= self.starts_at {
        error.insert("Events must end after they start");
      }
      error.build()
    });
    fields.insert("images", {
      let mut slice = ValidateError::slice_builder();
      for image in &self.images {
        slice.insert(if validate_url(image) {
          None
        } else {
          let mut error = ValidateError::msg_builder();
          error.insert("Must be a valid URL");
          Some(error.build())
        });
      }
      slice.build()
    });
    fields.build().into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn filled() -> Request {
    let starts_at = Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap();
    Request {
      title: "Monthly meetup".into(),
      description: "Kick off with #rustlang talks".into(),
      location: "Berlin".into(),
      starts_at,
      ends_at: starts_at + chrono::Duration::hours(2),
      images: Vec::new(),
    }
  }

  #[test]
  fn accepts_a_filled_request() {
    assert!(filled().validate().is_ok());
  }

  #[test]
  fn rejects_inverted_schedules() {
    let mut form = filled();
    form.ends_at = form.starts_at;
    assert!(form.validate().is_err());

    let mut form = filled();
    form.ends_at = form.starts_at - chrono::Duration::minutes(5);
    assert!(form.validate().is_err());
  }

  #[test]
  fn rejects_blank_fields() {
    for field in ["title", "description", "location"] {
      let mut form = filled();
      match field {
        "title" => form.title = String::new(),
        "description" => form.description = "  ".into(),
        _ => form.location = String::new(),
      }
      assert!(form.validate().is_err(), "blank {field}");
    }
  }
}
