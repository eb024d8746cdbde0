use serde::{Deserialize, Serialize};

/// Admin moderation switch; `false` approves the board.
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub is_pending: bool,
}
