use serde::{Deserialize, Serialize};
use std::fmt;

/// Keeps secrets (tokens, passwords, connection strings) out of
/// `Debug` and `Display` output while serializing transparently.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
  pub const fn new(value: T) -> Self {
    Self(value)
  }

  pub fn into_inner(self) -> T {
    self.0
  }
}

impl Sensitive<String> {
  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl<T> fmt::Debug for Sensitive<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<hidden>")
  }
}

impl<T> fmt::Display for Sensitive<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<hidden>")
  }
}

impl<T> AsRef<T> for Sensitive<T> {
  fn as_ref(&self) -> &T {
    &self.0
  }
}

impl<T> From<T> for Sensitive<T> {
  fn from(value: T) -> Self {
    Self(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_and_display_never_leak() {
    let secret = Sensitive::new(String::from("hunter2"));
    assert_eq!("<hidden>", format!("{secret:?}"));
    assert_eq!("<hidden>", format!("{secret}"));
    assert_eq!("hunter2", secret.as_str());
  }

  #[test]
  fn serde_is_transparent() {
    let secret = Sensitive::new(String::from("hunter2"));
    serde_test::assert_tokens(&secret, &[serde_test::Token::Str("hunter2")]);
  }
}
