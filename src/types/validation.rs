use once_cell::sync::Lazy;
use regex::Regex;

pub const USERNAME_MIN_LEN: usize = 6;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 254;
pub const DISPLAY_NAME_MAX_LEN: usize = 60;

pub const TITLE_MAX_LEN: usize = 60;
pub const DESCRIPTION_MAX_LEN: usize = 256;
pub const LANGUAGE_MAX_LEN: usize = 60;
pub const LOCATION_MAX_LEN: usize = 120;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9\.\-_]*[A-Za-z0-9]$").expect("username pattern must compile")
});

// the HTML5 email pattern, which is lenient enough in practice
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
  )
  .expect("email pattern must compile")
});

#[must_use]
pub fn is_valid_username(username: &str) -> bool {
  let length = username.chars().count();
  (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&length) && USERNAME_REGEX.is_match(username)
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
  email.chars().count() <= EMAIL_MAX_LEN && EMAIL_REGEX.is_match(email)
}

#[must_use]
pub fn is_valid_password(password: &str) -> bool {
  let length = password.chars().count();
  (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&length)
}
