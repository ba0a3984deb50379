use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};
use uuid::Uuid;

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

lazy_static! {
    // Hash of a throwaway password, built with the same parameters as real hashes.
    static ref DUMMY_HASH: String =
        hash_password(&Uuid::new_v4().to_string()).unwrap_or_default();
}

#[cfg(test)]
static DUMMY_VERIFICATIONS: AtomicUsize = AtomicUsize::new(0);

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored PHC hash. A hash that does not parse is a
/// mismatch, not an error.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Do the argon2 work of a real check when no account matched, so an unknown
/// email costs as much as a wrong password. Always returns false.
pub fn verify_against_dummy(plain: &str) -> bool {
    #[cfg(test)]
    DUMMY_VERIFICATIONS.fetch_add(1, Ordering::SeqCst);

    let _ = verify_password(plain, &DUMMY_HASH);
    false
}

#[cfg(test)]
pub fn dummy_verifications() -> usize {
    DUMMY_VERIFICATIONS.load(Ordering::SeqCst)
}
