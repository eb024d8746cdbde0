use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::extras::validate_url;
use validator::{HasLength, Validate, ValidateError};

use crate::types::validation::{LOCATION_MAX_LEN, TITLE_MAX_LEN};

/// Partial update; absent fields are left untouched. The schedule
/// order is only checked when both ends travel together.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
  pub title: Option<String>,
  pub description: Option<String>,
  pub location: Option<String>,
  pub starts_at: Option<DateTime<Utc>>,
  pub ends_at: Option<DateTime<Utc>>,
  pub images: Option<Vec<String>>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    if let Some(title) = self.title.as_deref() {
      fields.insert("title", {
        let mut error = ValidateError::msg_builder();
        if title.trim().is_empty() {
          error.insert("Title cannot be emptied");
        } else if title.length() > TITLE_MAX_LEN {
          error.insert("Title is too long");
        }
        error.build()
      });
    }
    if let Some(description) = self.description.as_deref() {
      fields.insert("description", {
        let mut error = ValidateError::msg_builder();
        if description.trim().is_empty() {
          error.insert("Description cannot be emptied");
        }
        error.build()
      });
    }
    if let Some(location) = self.location.as_deref() {
      fields.insert("location", {
        let mut error = ValidateError::msg_builder();
        if location.trim().is_empty() {
          error.insert("Location cannot be emptied");
        } else if location.length() > LOCATION_MAX_LEN {
          error.insert("Location is too long");
        }
        error.build()
      });
    }
    if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
      fields.insert("ends_at", {
        let mut error = ValidateError::msg_builder();
        if ends_at <= starts_at {
          error.insert("Events must end after they start");
        }
        error.build()
      });
    }
    if let Some(images) = self.images.as_deref() {
      let mut slice = ValidateError::slice_builder();
      for image in images {
        slice.insert(if validate_url(image) {
          None
        } else {
          let mut error = ValidateError::msg_builder();
          error.insert("Must be a valid URL");
          Some(error.build())
        });
      }
      fields.insert("images", slice.build());
    }
    fields.build().into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn empty_patch_passes() {
    assert!(Request::default().validate().is_ok());
  }

  #[test]
  fn schedule_order_checked_when_both_present() {
    let starts_at = Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap();
    let form = Request {
      starts_at: Some(starts_at),
      ends_at: Some(starts_at - chrono::Duration::hours(1)),
      ..Default::default()
    };
    assert!(form.validate().is_err());

    let form = Request {
      ends_at: Some(starts_at),
      ..Default::default()
    };
    assert!(form.validate().is_ok());
  }
}
