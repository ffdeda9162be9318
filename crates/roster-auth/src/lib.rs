//! Roster Authentication
//!
//! Password hashing and JWT issuance/validation for the roster service.

pub mod error;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use jwt::{AuthUser, Claims, TokenIssuer};
pub use password::{hash_password, verify_password};
