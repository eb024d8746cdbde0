use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use super::{image_errors, required_text, video_errors};
use crate::schema::BoardVideo;
use crate::types::validation::{DESCRIPTION_MAX_LEN, LANGUAGE_MAX_LEN, TITLE_MAX_LEN};

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
  pub title: Option<String>,
  pub description: Option<String>,
  pub language: Option<String>,
  pub content: Option<String>,
  pub images: Option<Vec<String>>,
  pub video: Option<BoardVideo>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    if let Some(title) = self.title.as_deref() {
      fields.insert("title", required_text(title, TITLE_MAX_LEN));
    }
    if let Some(description) = self.description.as_deref() {
      fields.insert(
        "description",
        required_text(description, DESCRIPTION_MAX_LEN),
      );
    }
    if let Some(language) = self.language.as_deref() {
      fields.insert("language", required_text(language, LANGUAGE_MAX_LEN));
    }
    if let Some(content) = self.content.as_deref() {
      fields.insert("content", {
        let mut error = ValidateError::msg_builder();
        if content.trim().is_empty() {
          error.insert("Content cannot be emptied");
        }
        error.build()
      });
    }
    if let Some(images) = self.images.as_deref() {
      fields.insert("images", image_errors(images));
    }
    if let Some(video) = self.video.as_ref() {
      fields.insert("video", video_errors(video));
    }
    fields.build().into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_patch_passes_validation() {
    assert!(Request::default().validate().is_ok());
  }

  #[test]
  fn present_fields_are_still_bounded() {
    let form = Request {
      title: Some(String::new()),
      ..Default::default()
    };
    assert!(form.validate().is_err());

    let form = Request {
      content: Some("   ".into()),
      ..Default::default()
    };
    assert!(form.validate().is_err());

    let form = Request {
      title: Some("Renamed".into()),
      content: Some("still has #tags".into()),
      ..Default::default()
    };
    assert!(form.validate().is_ok());
  }
}
