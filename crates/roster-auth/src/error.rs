//! Errors shared by password hashing and token issuance

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
