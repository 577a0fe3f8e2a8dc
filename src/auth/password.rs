/// Password Hashing and Verification
///
/// One-way bcrypt hashing with a fresh salt per call and a fixed work
/// factor. Library failures surface as `AppError::Crypto`, never as an
/// authentication failure.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt work factor
pub const HASH_COST: u32 = 10;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AppError::Crypto` if bcrypt fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Crypto(format!("Password hashing failed: {}", e))
    })
}

/// Verify a password against its hash
///
/// `Ok(false)` means the password does not match; `Err` means the digest
/// could not be processed at all.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash).map_err(|e| {
        tracing::error!(error = %e, "password verification failed");
        AppError::Crypto(format!("Password verification failed: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2b$10$"));
    }

    #[test]
    fn test_verify_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        let is_valid = verify_password("WrongPassword123", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_salt_differs_per_call() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("same-password", &first).unwrap());
        assert!(verify_password("same-password", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_crypto_failure() {
        match verify_password("anything", "not-a-valid-hash") {
            Err(AppError::Crypto(_)) => (),
            other => panic!("expected crypto failure, got {:?}", other),
        }
    }
}
