//! Password hashing and verification
//!
//! Hashing and comparison run on the blocking thread pool; both report
//! failures through their `Result` and never panic.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{Error as HashError, SaltString},
};
use thiserror::Error;

/// Argon2 pass count
pub const HASH_WORK_FACTOR: u32 = 10;

/// Argon2 memory cost in KiB per pass
const HASH_MEMORY_KIB: u32 = 4 * 1024;

/// Password hashing failures
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(HASH_MEMORY_KIB, HASH_WORK_FACTOR, 1, None)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Produce a salted PHC-format hash of `password`
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::thread_rng());
        hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    })
    .await?
}

/// Check `candidate` against a stored hash.
///
/// A mismatch is `Ok(false)`; only an unusable hash or a failed task is an
/// error. The parameters embedded in the stored hash are honoured, so hashes
/// created with an older work factor keep verifying.
pub async fn compare_password(candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let candidate = candidate.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    })
    .await?
}
