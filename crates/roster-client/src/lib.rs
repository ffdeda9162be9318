//! Roster API Client
//!
//! Typed client for the roster HTTP API with a local session guard:
//! failed-login lockout, token expiry tracking, and forced re-login
//! when the server rejects a token.

pub mod client;
pub mod error;
pub mod session;

pub use client::{
    AccountInfo, ApiClient, EmployeeRecordInfo, LoginResponse, NewRecordRequest, RegisterRequest,
    UserInfo,
};
pub use error::ClientError;
pub use session::{SessionGuard, SessionState, LOCKOUT_WINDOW, MAX_LOGIN_ATTEMPTS};
