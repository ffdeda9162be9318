//! Client error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Account locked, retry in {}s", .0.as_secs())]
    Locked(Duration),

    #[error("Session expired")]
    SessionExpired,

    #[error("Server returned error: {status} - {message}")]
    Api { status: u16, message: String },
}
