//! Password hashing for the credential store.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
//! The cost travels with every hash, so raising it leaves stored passwords
//! verifiable. Hashing runs on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;
pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;

pub(crate) fn params(memory_kib: u32, iterations: u32) -> ResultEngine<Params> {
    Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None).map_err(|err| {
        EngineError::InvalidRequest(format!("invalid password hashing cost: {err}"))
    })
}

fn hashing_failed(err: password_hash::Error) -> EngineError {
    EngineError::Internal(format!("password hashing failed: {err}"))
}

fn hash_blocking(password: &str, params: Params) -> ResultEngine<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(hashing_failed)?;
    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(hashing_failed)?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, stored: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|_| EngineError::Internal("stored password hash is corrupt".to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(hashing_failed(err)),
    }
}

async fn off_worker<T, F>(job: F) -> ResultEngine<T>
where
    T: Send + 'static,
    F: FnOnce() -> ResultEngine<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| EngineError::Internal(format!("password hashing task failed: {err}")))?
}

/// Hashes `password` with a fresh random salt.
pub(crate) async fn hash_password(password: String, params: Params) -> ResultEngine<String> {
    off_worker(move || hash_blocking(&password, params)).await
}

/// Returns `Ok(false)` on mismatch. A stored value that is not a valid
/// hash is [`EngineError::Internal`].
pub(crate) async fn verify_password(password: String, stored: String) -> ResultEngine<bool> {
    off_worker(move || verify_blocking(&password, &stored)).await
}
