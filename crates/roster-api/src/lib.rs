//! Roster REST API
//!
//! Axum handlers for authentication, account administration, employee
//! records and certificate storage, plus the ambient health and metrics
//! endpoints.

pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use rate_limit::{RateLimiter, RatePolicy};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
