// Authentication helpers
// Session tokens (JWT) and password hashing (bcrypt)

pub mod jwt;
pub mod password;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token lifetime of {0} hours is out of range")]
    Lifetime(i64),
}
