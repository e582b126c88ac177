// Password hashing and password policy
// Uses bcrypt for hashing

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

use crate::domain::DomainError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Hashes a password using bcrypt
///
/// # Example
/// ```
/// use teamhub_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("my_password").unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Verifies a password against a bcrypt hash
///
/// A malformed stored hash is an error, a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(verify(password, hash)?)
}

/// Checks a new password against the policy
///
/// `confirmation`, when the form has one, must match exactly.
pub fn validate_new_password(password: &str, confirmation: Option<&str>) -> Result<(), DomainError> {
    if let Some(confirmation) = confirmation {
        if confirmation != password {
            return Err(DomainError::validation("Passwords do not match"));
        }
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
