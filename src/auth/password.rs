// Password hashing utilities
// Uses bcrypt for secure password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

use super::AuthError;

/// Hashes a password using bcrypt at the default cost
///
/// # Example
/// ```
/// use teamdesk_api::auth::password::{hash_password_with_cost, verify_password};
///
/// let hash = hash_password_with_cost("my_password", 4).unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes with an explicit bcrypt cost (4..=31)
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

/// Verifies a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, hash)?)
}
