//! HTTP server for the Yakety website.
//!
//! This crate provides the development and production server using axum,
//! serving:
//! - API endpoints (`/api/hello`, `/api/health`)
//! - Static files from the built site directory
//! - The live reload browser script (`/live-reload.js`)
//! - WebSocket endpoint for live reload in development mode
//!
//! # Quick Start
//!
//! ```ignore
//! use yakety_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         dev: true,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (yakety-server)
//!                        │
//!                        ├─► API routes
//!                        │
//!                        ├─► /ws/live-reload (dev only)
//!                        │       │
//!                        │       └─► hub ◄── LiveReloadManager ◄── yakety-watch (notify)
//!                        │
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use state::AppState;
use yakety_watch::{ChangeSource, FsChangeSource};

pub use error::ServerError;
pub use live_reload::{
    ClientAction, ClientEvent, ClientReconnector, ClientState, LOCAL_HOSTS, is_local_host,
};

use live_reload::LiveReloadManager;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Development mode; gates live reload.
    pub dev: bool,
    /// Directory served as static files.
    pub static_dir: PathBuf,
    /// Directory watched for live reload.
    pub watch_root: PathBuf,
    /// Optional glob patterns restricting which changes trigger a reload.
    pub watch_patterns: Vec<String>,
    /// Debounce window in milliseconds (0 disables debouncing).
    pub debounce_ms: u64,
    /// Port the browser script connects back to.
    pub client_port: u16,
    /// Application version.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3333,
            dev: false,
            static_dir: PathBuf::from("html"),
            watch_root: PathBuf::from("html"),
            watch_patterns: Vec::new(),
            debounce_ms: 0,
            client_port: 3333,
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// Live reload problems never stop the server; only an invalid address or a
/// failed bind does.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let source = FsChangeSource::new(config.watch_root.clone())
        .with_patterns(config.watch_patterns.clone());
    let state = build_state(&config, &source);

    let app = app::create_router(state, &config.static_dir);

    let address = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = address
        .parse()
        .map_err(|source| ServerError::InvalidAddress { address, source })?;
    tracing::info!(address = %addr, dev = config.dev, version = %config.version, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: addr,
            source,
        })?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    Ok(())
}

fn build_state(config: &ServerConfig, source: &dyn ChangeSource) -> Arc<AppState> {
    let live_reload = if config.dev {
        start_live_reload(source, Duration::from_millis(config.debounce_ms))
    } else {
        None
    };

    Arc::new(AppState {
        live_reload,
        dev: config.dev,
        client_port: config.client_port,
        started_at: Instant::now(),
    })
}

/// Start watching, or disable live reload with a single warning.
fn start_live_reload(source: &dyn ChangeSource, debounce: Duration) -> Option<LiveReloadManager> {
    match LiveReloadManager::start(source, debounce) {
        Ok(manager) => {
            tracing::debug!(root = %manager.root().display(), "Live reload enabled");
            Some(manager)
        }
        Err(e) => {
            tracing::warn!(
                root = %source.root().display(),
                error = %e,
                "Failed to start file watcher, live reload disabled"
            );
            None
        }
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Yakety config.
///
/// # Arguments
///
/// * `config` - Yakety configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_config(config: &yakety_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        dev: config.server.dev,
        static_dir: config.static_resolved.dir.clone(),
        watch_root: config.live_reload_resolved.root.clone(),
        watch_patterns: config.live_reload_resolved.watch_patterns.clone(),
        debounce_ms: config.live_reload_resolved.debounce_ms,
        client_port: config.client_port(),
        version,
    }
}
