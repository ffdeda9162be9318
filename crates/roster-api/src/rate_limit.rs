//! Fixed-window rate limiting keyed by client IP
//!
//! Two budgets apply: a strict one for the login route and a general one
//! for every other `/api` path. When a window's budget is spent, a small
//! number of requests may queue and sleep until the window rolls over;
//! anything beyond the queue is rejected with 429.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Login attempts allowed per window
pub const LOGIN_MAX_REQUESTS: u32 = 5;
/// Login window length
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Overflow login requests that may wait for the next window
pub const LOGIN_QUEUE_DEPTH: u32 = 2;

/// General API requests allowed per window
pub const GENERAL_MAX_REQUESTS: u32 = 100;
/// General window length
pub const GENERAL_WINDOW: Duration = Duration::from_secs(60);
/// Overflow general requests that may wait for the next window
pub const GENERAL_QUEUE_DEPTH: u32 = 10;

/// Entries idle past this are dropped by `cleanup`
const IDLE_CUTOFF: Duration = Duration::from_secs(30 * 60);

/// One window's budget for a route class
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub max_requests: u32,
    pub window: Duration,
    pub queue_depth: u32,
}

impl RatePolicy {
    pub const fn login() -> Self {
        Self {
            max_requests: LOGIN_MAX_REQUESTS,
            window: LOGIN_WINDOW,
            queue_depth: LOGIN_QUEUE_DEPTH,
        }
    }

    pub const fn general() -> Self {
        Self {
            max_requests: GENERAL_MAX_REQUESTS,
            window: GENERAL_WINDOW,
            queue_depth: GENERAL_QUEUE_DEPTH,
        }
    }
}

struct IpEntry {
    count: u32,
    queued: u32,
    window_start: Instant,
}

/// Admission decision for one request
#[derive(Debug)]
enum Admission {
    Allowed,
    /// Wait this long for the window to roll over, then proceed
    Queued(Duration),
    /// Over budget and queue; retry after this long
    Rejected(Duration),
}

#[derive(Clone)]
pub struct RateLimiter {
    login: RatePolicy,
    general: RatePolicy,
    /// route class -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new(login: RatePolicy, general: RatePolicy) -> Self {
        Self {
            login,
            general,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn policy_for(&self, path: &str) -> (&'static str, RatePolicy) {
        if path == "/api/auth/login" {
            ("login", self.login)
        } else {
            ("general", self.general)
        }
    }

    async fn admit(&self, route: &'static str, ip: &str, policy: &RatePolicy) -> Admission {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            queued: 0,
            window_start: now,
        });

        // A fresh window clears the counter; queued slots carry over
        if now.duration_since(entry.window_start) >= policy.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count < policy.max_requests {
            entry.count += 1;
            return Admission::Allowed;
        }

        let remaining = policy
            .window
            .saturating_sub(now.duration_since(entry.window_start));
        if entry.queued < policy.queue_depth {
            entry.queued += 1;
            Admission::Queued(remaining)
        } else {
            Admission::Rejected(remaining)
        }
    }

    /// Take the slot a queued request waited for once its window rolled over
    async fn take_queued_slot(&self, route: &'static str, ip: &str, policy: &RatePolicy) {
        let mut map = self.inner.lock().await;
        let Some(entry) = map.get_mut(route).and_then(|m| m.get_mut(ip)) else {
            return;
        };

        let now = Instant::now();
        if now.duration_since(entry.window_start) >= policy.window {
            entry.count = 0;
            entry.window_start = now;
        }
        entry.queued = entry.queued.saturating_sub(1);
        entry.count += 1;
    }

    /// Drop idle entries so the map stays bounded
    ///
    /// The cutoff exceeds every window length; entries with waiters are
    /// always kept.
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| {
                entry.queued > 0 || now.duration_since(entry.window_start) < IDLE_CUTOFF
            });
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Extract client IP: X-Forwarded-For header first, then the peer address
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        // X-Forwarded-For can be comma-separated; first entry is the client
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Middleware applying the login or general budget by request path
pub async fn limit_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();
    if !path.starts_with("/api") {
        return Ok(next.run(request).await);
    }

    let (route, policy) = state.limiter.policy_for(path);
    let ip = extract_ip(&request);

    match state.limiter.admit(route, &ip, &policy).await {
        Admission::Allowed => {}
        Admission::Queued(wait) => {
            debug!("Rate limit queue on {} for {}: waiting {:?}", route, ip, wait);
            tokio::time::sleep(wait).await;
            state.limiter.take_queued_slot(route, &ip, &policy).await;
        }
        Admission::Rejected(retry_after) => {
            warn!("Rate limit exceeded on {} for {}", route, ip);
            metrics::counter!("roster_rate_limited_total").increment(1);
            return Err(ApiError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }
    }

    Ok(next.run(request).await)
}
