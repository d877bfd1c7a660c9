/// Password Hashing and Verification
///
/// argon2id with fixed parameters. The produced PHC string carries the
/// algorithm, parameters and salt, so verification never needs configuration.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::error::HashingError;

/// Memory cost in KiB (64 MiB)
pub const MEMORY_COST_KIB: u32 = 64 * 1024;
/// Number of passes
pub const TIME_COST: u32 = 1;
/// Degree of parallelism
pub const PARALLELISM: u32 = 2;
/// Digest length in bytes
pub const OUTPUT_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>, HashingError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| HashingError::Hashing(format!("invalid argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random salt
///
/// # Errors
/// Returns error only if salt generation or the hashing primitive fails
pub fn hash_password(password: &str) -> Result<String, HashingError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashingError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash
///
/// Returns `Ok(false)` for a wrong password.
///
/// # Errors
/// Returns error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashingError> {
    let parsed = PasswordHash::new(hash).map_err(|e| HashingError::MalformedHash(e.to_string()))?;

    // Parameters come from the parsed hash, not from `hasher()`
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashingError::MalformedHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$argon2id$v=19$m=65536,t=1,p=2$"));
    }

    #[test]
    fn test_verify_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        let is_valid = verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        let is_valid = verify_password("WrongPassword123", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let first = hash_password("same-password").expect("Failed to hash password");
        let second = hash_password("same-password").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(verify_password("same-password", &first).unwrap());
        assert!(verify_password("same-password", &second).unwrap());
    }

    #[test]
    fn test_empty_password_still_hashes() {
        let hash = hash_password("").expect("Failed to hash password");
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify_password("whatever", "not-a-phc-string");
        assert!(matches!(result, Err(HashingError::MalformedHash(_))));
    }
}
