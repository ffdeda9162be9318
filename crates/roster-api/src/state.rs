//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use roster_auth::TokenIssuer;
use roster_storage::FileStore;
use roster_store::{AccountStore, RecordStore};
use std::sync::Arc;

use crate::rate_limit::RateLimiter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub records: Arc<dyn RecordStore>,
    pub files: Arc<dyn FileStore>,
    pub tokens: Arc<TokenIssuer>,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        records: Arc<dyn RecordStore>,
        files: Arc<dyn FileStore>,
        tokens: Arc<TokenIssuer>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            accounts,
            records,
            files,
            tokens,
            limiter,
        }
    }
}

/// Handle for rendering collected Prometheus metrics
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Render the current metrics in Prometheus exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
