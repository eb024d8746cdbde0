use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use super::{image_errors, required_text, video_errors};
use crate::schema::BoardVideo;
use crate::types::validation::{DESCRIPTION_MAX_LEN, LANGUAGE_MAX_LEN, TITLE_MAX_LEN};

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub title: String,
  pub description: String,
  pub language: String,
  pub content: String,
  #[serde(default)]
  pub images: Vec<String>,
  pub video: Option<BoardVideo>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("title", required_text(&self.title, TITLE_MAX_LEN));
    fields.insert(
      "description",
      required_text(&self.description, DESCRIPTION_MAX_LEN),
    );
    fields.insert("language", required_text(&self.language, LANGUAGE_MAX_LEN));
    fields.insert("content", {
      let mut error = ValidateError::msg_builder();
      if self.content.trim().is_empty() {
        error.insert("Content is required");
      }
      error.build()
    });
    fields.insert("images", image_errors(&self.images));
    if let Some(video) = self.video.as_ref() {
      fields.insert("video", video_errors(video));
    }
    fields.build().into_result()
  }
}
