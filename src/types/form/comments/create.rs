use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub board_id: String,
  pub content: String,
  /// Present when the comment replies to another comment.
  pub parent_id: Option<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("board_id", {
      let mut error = ValidateError::msg_builder();
      if self.board_id.trim().is_empty() {
        error.insert("Board is required");
      }
      error.build()
    });
    fields.insert("content", {
      let mut error = ValidateError::msg_builder();
      if self.content.trim().is_empty() {
        error.insert("Content is required");
      }
      error.build()
    });
    fields.build().into_result()
  }
}
