//! staycache HTTP server
//!
//! Thin HTTP surface over the cached data store.
//!
//! # Endpoints
//!
//! ## Storage
//! - `GET /api/v1/storage?user_id=&key=` - Read a user-data record (cache first)
//! - `PUT /api/v1/storage` - Write a user-data record (write-through)
//!
//! ## Images
//! - `GET /api/v1/images?user_id=&category=` - List image metadata (cache first)
//!
//! ## Admin
//! - `POST /api/v1/cache/invalidate` - Drop a user's cached entries
//! - `GET /health` - Health check with per-layer cache statistics
//! - `GET /metrics` - Prometheus metrics
//!
//! # CLI Commands
//!
//! - `start` - Start the HTTP server (default if no command specified)
//! - `check-config` - Validate the configuration file and exit
//!
//! # Configuration
//!
//! The server reads configuration from:
//! 1. `--config <path>` command line flag
//! 2. `STAYCACHE_CONFIG` environment variable (path to TOML file)
//! 3. `./staycache.toml` in the current directory
//! 4. Default configuration

mod handlers;
mod types;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use handlers::AppState;
use staycache::cache::CacheLayers;
use staycache::config::Config;
use staycache::store::{CachedDataStore, MemoryStore};

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser)]
#[command(name = "staycache-server", version, about = "Cached user-data store server")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Start,
    /// Validate configuration and exit
    CheckConfig,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Load configuration from flag, environment, default file, or defaults
///
/// Messages go to stderr because the tracing subscriber is not installed
/// until the config (and its log level) is known.
fn load_config(cli_path: Option<&str>) -> Config {
    if let Some(path) = cli_path {
        match Config::load(path) {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from: {}", path);
                return config;
            }
            Err(e) => {
                eprintln!("[config] Failed to load {}: {}. Using defaults.", path, e);
                return Config::default();
            }
        }
    }

    if let Ok(path) = std::env::var("STAYCACHE_CONFIG") {
        match Config::load(&path) {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from: {}", path);
                return config;
            }
            Err(e) => {
                eprintln!("[config] Failed to load {}: {}. Trying defaults.", path, e);
            }
        }
    }

    if std::path::Path::new("staycache.toml").exists() {
        match Config::load("staycache.toml") {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from staycache.toml");
                return config;
            }
            Err(e) => {
                eprintln!("[config] Failed to parse staycache.toml: {}. Using defaults.", e);
            }
        }
    }

    Config::default()
}

// =============================================================================
// Router and Server Setup
// =============================================================================

/// Build CORS layer from configuration
fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }
}

/// Build the application router
fn build_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Storage API
        .route(
            "/api/v1/storage",
            get(handlers::get_storage).put(handlers::put_storage),
        )
        // Image API
        .route("/api/v1/images", get(handlers::get_images))
        // Cache admin
        .route("/api/v1/cache/invalidate", post(handlers::invalidate_cache))
        .layer(cors)
        .with_state(state)
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> staycache::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    if let Some(Command::CheckConfig) = cli.command {
        match config.validate() {
            Ok(()) => {
                println!("Configuration OK");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration invalid: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.monitoring.log_level)),
        )
        .init();

    // Cache layers are constructed once and injected; sweepers run until
    // shutdown joins them.
    let caches = Arc::new(CacheLayers::new(&config.cache));
    caches.start_sweepers();
    info!(
        sweep_interval_secs = config.cache.sweep_interval_secs,
        "cache layers initialized"
    );

    let remote = Arc::new(MemoryStore::new());
    let store = CachedDataStore::new(remote, Arc::clone(&caches));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| staycache::Error::Configuration(format!("invalid listen address: {}", e)))?;

    let state = Arc::new(AppState { store, config });
    let app = build_router(state);

    info!(%addr, "staycache server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down, stopping sweepers");
    tokio::time::timeout(Duration::from_secs(10), caches.shutdown())
        .await
        .ok();

    Ok(())
}
