use serde::Deserialize;
use std::num::NonZeroU64;
use validator::{HasLength, Validate, ValidateError};

use crate::util::Sensitive;

/// Token issuance settings.
#[derive(Debug, Deserialize)]
pub struct Auth {
  /// Key the HS512 access tokens are signed with.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_AUTH_JWT_SECRET`
  pub jwt_secret: Sensitive<String>,
  /// Access token lifetime. Short by design; refresh tokens carry
  /// the long-lived session.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_AUTH_ACCESS_TOKEN_SECS`
  #[serde(default = "Auth::default_access_token_secs")]
  pub access_token_secs: NonZeroU64,
  /// How long a refresh session stays valid without being rotated.
  ///
  /// **Environment variables**:
  /// - `SNIPBOARD_AUTH_SESSION_DAYS`
  #[serde(default = "Auth::default_session_days")]
  pub session_days: NonZeroU64,
}

impl Auth {
  const DEFAULT_ACCESS_TOKEN_SECS: u64 = 900;
  const DEFAULT_SESSION_DAYS: u64 = 365;

  const MIN_JWT_SECRET_LEN: usize = 12;
  const MAX_JWT_SECRET_LEN: usize = 1024;

  // Required by serde
  const fn default_access_token_secs() -> NonZeroU64 {
    match NonZeroU64::new(Self::DEFAULT_ACCESS_TOKEN_SECS) {
      Some(n) => n,
      None => panic!("DEFAULT_ACCESS_TOKEN_SECS is accidentally set to 0"),
    }
  }

  const fn default_session_days() -> NonZeroU64 {
    match NonZeroU64::new(Self::DEFAULT_SESSION_DAYS) {
      Some(n) => n,
      None => panic!("DEFAULT_SESSION_DAYS is accidentally set to 0"),
    }
  }
}

impl Validate for Auth {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("jwt_secret", {
      let mut error = ValidateError::msg_builder();
      let length = self.jwt_secret.as_str().length();
      if !(Self::MIN_JWT_SECRET_LEN..=Self::MAX_JWT_SECRET_LEN).contains(&length) {
        error.insert("Invalid JWT secret key");
      }
      error.build()
    });
    fields.build().into_result()
  }
}
