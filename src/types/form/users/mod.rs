use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::User;

pub mod login;
pub mod refresh;
pub mod register;

/// User shape returned by registration, login and profile reads.
/// The password hash never leaves the schema type.
#[derive(Debug, Deserialize, Serialize)]
pub struct UserData {
  pub id: String,
  pub name: String,
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub admin: bool,
  pub slug: String,
  pub created_at: DateTime<Utc>,
}

impl From<User> for UserData {
  fn from(user: User) -> Self {
    Self {
      id: user.id.to_hex(),
      name: user.name,
      display_name: user.display_name,
      email: user.email,
      admin: user.admin,
      slug: user.slug,
      created_at: user.created_at.to_chrono(),
    }
  }
}
