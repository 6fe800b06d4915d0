//! Password hashing utilities

use bcrypt::DEFAULT_COST;

use crate::shared::{DomainError, DomainResult};

/// Hash a password using bcrypt
pub fn hash(password: &str) -> DomainResult<String> {
    bcrypt::hash(password, DEFAULT_COST)
        .map_err(|e| DomainError::Storage(format!("password hashing failed: {}", e)))
}

/// Verify a password against a hash
pub fn verify(password: &str, hashed: &str) -> DomainResult<bool> {
    bcrypt::verify(password, hashed)
        .map_err(|e| DomainError::Storage(format!("password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hashed = hash(password).unwrap();

        assert!(verify(password, &hashed).unwrap());
        assert!(!verify("wrong_password", &hashed).unwrap());
    }
}
