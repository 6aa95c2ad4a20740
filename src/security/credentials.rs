//! Password hashing and verification (Argon2id PHC strings).

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use tracing::warn;

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

/// Check `candidate` against a stored PHC hash. A malformed hash and a wrong
/// password are the same outcome to the caller; the former is only logged.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(target: "ceres::auth", "stored password hash is unreadable: {}", e);
            return false;
        }
    };
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(password_hash::Error::Password) => false,
        Err(e) => {
            warn!(target: "ceres::auth", "password verification failed: {}", e);
            false
        }
    }
}
