use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use error_stack::{Result, ResultExt};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use thiserror::Error;

static CONTEXT: Lazy<Argon2<'static>> =
  Lazy::new(|| Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT));

const TOKEN_LENGTH: usize = 64;
const TOKEN_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
#[error("could not hash password")]
pub struct HashPasswordError;

#[derive(Debug, Error)]
#[error("could not verify password")]
pub struct VerifyPasswordError;

pub fn hash_password(password: impl AsRef<[u8]>) -> Result<String, HashPasswordError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = CONTEXT
    .hash_password(password.as_ref(), &salt)
    .change_context(HashPasswordError)?;

  Ok(hash.to_string())
}

/// Checks a password against a stored hash.
///
/// A wrong password is `Ok(false)`, not an error. `Err` means the
/// stored hash itself could not be processed.
pub fn verify_password(password: &[u8], hash: &str) -> Result<bool, VerifyPasswordError> {
  let parsed = PasswordHash::new(hash)
    .change_context(VerifyPasswordError)
    .attach_printable("could not parse password hash")?;

  match CONTEXT.verify_password(password, &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(error) => Err(error).change_context(VerifyPasswordError),
  }
}

/// Generates an opaque session refresh token.
#[must_use]
pub fn generate_refresh_token() -> String {
  random_string::generate(TOKEN_LENGTH, TOKEN_CHARSET)
}

/// Digest under which a session token is stored at rest.
#[must_use]
pub fn token_digest(token: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(token.as_bytes());
  hex::encode(hasher.finalize())
}
