//! TOML configuration with per-section defaults

use anyhow::{Context, Result};
use roster_api::RatePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Minimum length for the JWT signing secret, in bytes
const MIN_SECRET_BYTES: usize = 32;

/// Top-level configuration, one struct per file section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Token signing settings
///
/// There is no default signing secret: startup refuses to run until one
/// is provided via the config file or the `ROSTER_JWT_SECRET` variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    /// Validated signing secret
    pub fn secret(&self) -> Result<&str> {
        match self.jwt_secret.as_deref() {
            None => anyhow::bail!(
                "auth.jwt_secret is not set; refusing to start without a signing secret"
            ),
            Some(secret) if secret.len() < MIN_SECRET_BYTES => anyhow::bail!(
                "auth.jwt_secret must be at least {} bytes ({} given)",
                MIN_SECRET_BYTES,
                secret.len()
            ),
            Some(secret) => Ok(secret),
        }
    }
}

/// Rate limit configuration
///
/// Two independent budgets: one for the login endpoint, one for every
/// other `/api` route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_login_max_requests")]
    pub login_max_requests: u32,
    #[serde(default = "default_login_window_secs")]
    pub login_window_secs: u64,
    #[serde(default = "default_login_queue_depth")]
    pub login_queue_depth: u32,
    #[serde(default = "default_general_max_requests")]
    pub general_max_requests: u32,
    #[serde(default = "default_general_window_secs")]
    pub general_window_secs: u64,
    #[serde(default = "default_general_queue_depth")]
    pub general_queue_depth: u32,
}

impl LimitsConfig {
    pub fn login_policy(&self) -> RatePolicy {
        RatePolicy {
            max_requests: self.login_max_requests,
            window: Duration::from_secs(self.login_window_secs),
            queue_depth: self.login_queue_depth,
        }
    }

    pub fn general_policy(&self) -> RatePolicy {
        RatePolicy {
            max_requests: self.general_max_requests,
            window: Duration::from_secs(self.general_window_secs),
            queue_depth: self.general_queue_depth,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// Allowed origins; an empty list enables permissive dev mode
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Log filtering and output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// serde default functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_issuer() -> String {
    "roster".to_string()
}

fn default_audience() -> String {
    "roster-users".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_login_max_requests() -> u32 {
    5
}

fn default_login_window_secs() -> u64 {
    15 * 60
}

fn default_login_queue_depth() -> u32 {
    2
}

fn default_general_max_requests() -> u32 {
    100
}

fn default_general_window_secs() -> u64 {
    60
}

fn default_general_queue_depth() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: default_issuer(),
            audience: default_audience(),
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            login_max_requests: default_login_max_requests(),
            login_window_secs: default_login_window_secs(),
            login_queue_depth: default_login_queue_depth(),
            general_max_requests: default_general_max_requests(),
            general_window_secs: default_general_window_secs(),
            general_queue_depth: default_general_queue_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.issuer, "roster");
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.limits.login_max_requests, 5);
        assert_eq!(config.limits.general_window_secs, 60);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_secret_refused_when_missing_or_short() {
        let config = Config::default();
        assert!(config.auth.secret().is_err());

        let config: Config = toml::from_str(
            r#"
            [auth]
            jwt_secret = "too-short"
            "#,
        )
        .unwrap();
        assert!(config.auth.secret().is_err());
    }

    #[test]
    fn test_secret_accepted_at_minimum_length() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.auth.secret().unwrap(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_limit_policies_from_config() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            login_max_requests = 3
            login_window_secs = 120
            "#,
        )
        .unwrap();

        let login = config.limits.login_policy();
        assert_eq!(login.max_requests, 3);
        assert_eq!(login.window, Duration::from_secs(120));
        assert_eq!(login.queue_depth, 2);

        let general = config.limits.general_policy();
        assert_eq!(general.max_requests, 100);
        assert_eq!(general.window, Duration::from_secs(60));
    }
}
