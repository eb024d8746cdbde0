use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

/// Content is the only editable part of a comment.
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub content: String,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("content", {
      let mut error = ValidateError::msg_builder();
      if self.content.trim().is_empty() {
        error.insert("Content cannot be emptied");
      }
      error.build()
    });
    fields.build().into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_blank_replacements() {
    assert!(Request { content: String::new() }.validate().is_err());
    assert!(Request { content: "better wording".into() }.validate().is_ok());
  }
}
