//! API routes

mod accounts;
mod auth;
mod files;
mod health;
pub mod metrics;
mod records;
pub mod types;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use std::sync::Arc;

use crate::rate_limit;
use crate::state::{AppState, MetricsHandle};

pub use auth::{RequireAdmin, RequireAuth};

/// Request body cap: the upload limit plus multipart framing slack
const MAX_BODY_SIZE: usize = roster_storage::MAX_FILE_SIZE as usize + 1024 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(accounts::routes())
        .merge(records::routes())
        .merge(files::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    // Metrics stay outside the rate-limited stack
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
