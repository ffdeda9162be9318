//! Roster - employee record management backend

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod seed;

use config::{Config, LoggingConfig};
use roster_api::{AppState, MetricsHandle, RateLimiter, create_router};
use roster_auth::TokenIssuer;
use roster_storage::{FileStore, MemoryFileStore};
use roster_store::{AccountStore, MemoryAccountStore, MemoryRecordStore, RecordStore};

/// Interval between sweeps of idle rate-limit entries
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Roster - employee record management backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "ROSTER_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "ROSTER_PORT")]
    port: Option<u16>,

    /// JWT signing secret (overrides the config file)
    #[arg(long, env = "ROSTER_JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Seed demo accounts and employee records at startup
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = Some(secret);
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Roster v{}", env!("CARGO_PKG_VERSION"));

    // Refuse to start without a usable signing secret
    let secret = config.auth.secret()?;

    // Initialize the in-memory stores
    let accounts: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
    let records: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let files: Arc<dyn FileStore> = Arc::new(MemoryFileStore::new());

    // Create the default admin account if no accounts exist
    seed::seed_admin(accounts.as_ref()).await?;
    if args.seed_demo {
        seed::seed_demo(accounts.as_ref(), records.as_ref()).await?;
        info!("Demo fixture loaded");
    }

    // Initialize the token issuer
    let tokens = Arc::new(TokenIssuer::new(
        secret,
        &config.auth.issuer,
        &config.auth.audience,
        config.auth.token_ttl_minutes,
    ));

    // Initialize the rate limiter and its idle-entry sweeper
    let limiter = RateLimiter::new(config.limits.login_policy(), config.limits.general_policy());
    spawn_limiter_cleanup(limiter.clone());

    // Install the Prometheus recorder
    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;
    let metrics = Arc::new(MetricsHandle::new(recorder));

    // Assemble shared state
    let state = AppState::new(accounts, records, files, tokens, limiter);

    // Build the router with tracing and CORS layered on top
    let app = create_router(state, Some(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config.cors.allowed_origins));

    // CLI/env overrides win over the config file
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server; ConnectInfo feeds the per-IP rate limiter
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Build the CORS layer from configured origins
///
/// Explicit origins get a credentialed policy; an empty list falls back
/// to permissive dev mode.
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        warn!("No CORS origins configured, allowing any origin");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Periodically drop rate-limit entries for idle clients
fn spawn_limiter_cleanup(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
