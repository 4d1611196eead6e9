//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::MonitorError;

/// Hashes a plaintext password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns [`MonitorError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, MonitorError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MonitorError::Internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
///
/// # Errors
///
/// Returns [`MonitorError::Internal`] if the stored hash is malformed or
/// verification fails for a reason other than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, MonitorError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| MonitorError::Internal(format!("invalid password hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(MonitorError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}
