//! Password hashing. Argon2 is deliberately slow, so both operations run on the
//! blocking pool instead of an async worker thread.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::instrument;

use super::error::UserError;

#[instrument(skip_all)]
pub async fn hash_password(password: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    })
    .await
    .map_err(|e| UserError::PasswordHash(e.to_string()))?
}

/// `Ok(false)` for a wrong password; `Err` only when the stored hash is unreadable.
#[instrument(skip_all)]
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || -> Result<bool, UserError> {
        let parsed = PasswordHash::new(&password_hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| UserError::PasswordHash(e.to_string()))?
}
