use serde::{Deserialize, Serialize};

use crate::util::Sensitive;

/// The refresh token may travel in the body or in the http-only
/// cookie set at login; the body wins when both are present.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
  pub refresh_token: Option<Sensitive<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub access_token: Sensitive<String>,
  pub refresh_token: Sensitive<String>,
}
