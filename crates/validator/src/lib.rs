#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod std_impl;

pub use error::*;
pub mod extras;

/// Checks whether a value meets its own field-level invariants.
///
/// Implementations are expected to report **every** violated field,
/// not only the first one, by accumulating into a [`ValidateError`].
pub trait Validate {
  fn validate(&self) -> Result<(), ValidateError>;
}

pub trait HasLength {
  fn length(&self) -> usize;
}
