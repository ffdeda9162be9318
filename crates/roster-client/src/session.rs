//! Client-side session state

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Consecutive failed logins before the guard locks
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// How long a lockout lasts, measured from the last failed attempt
pub const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Session state as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Locked,
}

/// Local login state: token, expiry and the failed-attempt counter
///
/// The guard never talks to the network itself; [`crate::ApiClient`]
/// consults it before each login so a locked client fails fast without
/// sending a request. Methods taking an explicit `now` exist so tests
/// can move time without sleeping.
#[derive(Debug, Default)]
pub struct SessionGuard {
    failed_attempts: u32,
    last_attempt_at: Option<Instant>,
    token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejected login attempt
    pub fn record_failure(&mut self) {
        self.record_failure_at(Instant::now());
    }

    fn record_failure_at(&mut self, now: Instant) {
        // A failure after the window expired starts a fresh count
        if !self.is_locked_at(now) && self.window_elapsed(now) {
            self.failed_attempts = 0;
        }
        self.failed_attempts += 1;
        self.last_attempt_at = Some(now);
    }

    /// Record a successful login, clearing the failure counter
    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
        self.last_attempt_at = None;
    }

    /// Store the session token and its expiry
    pub fn set_session(&mut self, token: String, expires_at: DateTime<Utc>) {
        self.token = Some(token);
        self.token_expires_at = Some(expires_at);
    }

    /// Drop the stored token, reverting to Anonymous
    pub fn clear(&mut self) {
        self.token = None;
        self.token_expires_at = None;
    }

    fn window_elapsed(&self, now: Instant) -> bool {
        match self.last_attempt_at {
            Some(last) => now.duration_since(last) >= LOCKOUT_WINDOW,
            None => true,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Instant::now())
    }

    fn is_locked_at(&self, now: Instant) -> bool {
        self.failed_attempts >= MAX_LOGIN_ATTEMPTS && !self.window_elapsed(now)
    }

    /// Time left until the lockout lifts, `None` when not locked
    pub fn lockout_remaining(&self) -> Option<Duration> {
        self.lockout_remaining_at(Instant::now())
    }

    fn lockout_remaining_at(&self, now: Instant) -> Option<Duration> {
        if !self.is_locked_at(now) {
            return None;
        }
        self.last_attempt_at
            .map(|last| LOCKOUT_WINDOW - now.duration_since(last))
    }

    /// Login attempts left before the guard locks
    pub fn remaining_attempts(&self) -> u32 {
        self.remaining_attempts_at(Instant::now())
    }

    fn remaining_attempts_at(&self, now: Instant) -> u32 {
        if self.window_elapsed(now) {
            return MAX_LOGIN_ATTEMPTS;
        }
        MAX_LOGIN_ATTEMPTS.saturating_sub(self.failed_attempts)
    }

    /// The stored token, whether or not it has expired
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The stored token, only while it is still valid
    pub fn valid_token(&self) -> Option<&str> {
        self.valid_token_at(Utc::now())
    }

    fn valid_token_at(&self, wall: DateTime<Utc>) -> Option<&str> {
        match (&self.token, self.token_expires_at) {
            (Some(token), Some(expires_at)) if wall < expires_at => Some(token),
            _ => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_at(Instant::now(), Utc::now())
    }

    fn state_at(&self, now: Instant, wall: DateTime<Utc>) -> SessionState {
        if self.is_locked_at(now) {
            SessionState::Locked
        } else if self.valid_token_at(wall).is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }
}
