use serde::{Deserialize, Serialize};

use crate::schema::VoteDirection;

/// Casting the direction already held retracts the vote; the
/// opposite one replaces it.
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub direction: VoteDirection,
}
