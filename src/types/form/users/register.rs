use serde::{Deserialize, Serialize};
use validator::{HasLength, Validate, ValidateError};

use super::UserData;
use crate::types::validation::{
  is_valid_email, is_valid_password, is_valid_username, DISPLAY_NAME_MAX_LEN,
};
use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub username: Sensitive<String>,
  pub display_name: Option<String>,
  pub email: Option<Sensitive<String>>,
  pub password: Sensitive<String>,
  pub confirm_password: Sensitive<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("username", {
      let mut error = ValidateError::msg_builder();
      if !is_valid_username(self.username.as_str()) {
        error.insert("Invalid username");
      }
      error.build()
    });

    if let Some(display_name) = self.display_name.as_deref() {
      fields.insert("display_name", {
        let mut error = ValidateError::msg_builder();
        if display_name.trim().is_empty() {
          error.insert("Display name cannot be blank");
        } else if display_name.length() > DISPLAY_NAME_MAX_LEN {
          error.insert("Display name is too long");
        }
        error.build()
      });
    }

    if let Some(email) = self.email.as_ref() {
      fields.insert("email", {
        let mut error = ValidateError::msg_builder();
        if !is_valid_email(email.as_str()) {
          error.insert("Invalid e-mail address");
        }
        error.build()
      });
    }

    fields.insert("password", {
      let mut error = ValidateError::msg_builder();
      let trimmed = self.password.as_str().trim();
      if self.password.as_str().len() != trimmed.len() {
        error.insert("Passwords cannot start or end with spaces");
      } else if !is_valid_password(self.password.as_str()) {
        error.insert("Passwords must be 8 to 128 characters");
      }
      error.build()
    });

    if self.password.as_str() != self.confirm_password.as_str() {
      let mut error = ValidateError::msg_builder();
      error.insert("Passwords do not match");
      fields.insert("confirm_password", error.build());
    }

    fields.build().into_result()
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub user: UserData,
}
