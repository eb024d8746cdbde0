use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use super::UserData;
use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub username: Sensitive<String>,
  pub password: Sensitive<String>,
}

// Kept deliberately loose; telling a guesser which rule they broke
// would narrow their search.
impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("username", {
      let mut error = ValidateError::msg_builder();
      if self.username.as_str().trim().is_empty() {
        error.insert("Username is required");
      }
      error.build()
    });
    fields.insert("password", {
      let mut error = ValidateError::msg_builder();
      if self.password.as_str().is_empty() {
        error.insert("Password is required");
      }
      error.build()
    });
    fields.build().into_result()
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub user: UserData,
  pub access_token: Sensitive<String>,
  pub refresh_token: Sensitive<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn requires_both_credentials() {
    let form = Request {
      username: String::new().into(),
      password: "secret_enough".to_string().into(),
    };
    assert!(form.validate().is_err());

    let form = Request {
      username: "snippeteer".to_string().into(),
      password: String::new().into(),
    };
    assert!(form.validate().is_err());

    let form = Request {
      username: "snippeteer".to_string().into(),
      password: "secret_enough".to_string().into(),
    };
    assert!(form.validate().is_ok());
  }
}
