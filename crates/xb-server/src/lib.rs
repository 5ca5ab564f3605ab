//! HTTP server for xb.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Rendered pages: `/?c=<category>&p=<page>`, `/<category>` and
//!   `/<category>/<page>`
//! - Static assets from the site's public directory
//!
//! Every page request gets its own [`PageRenderer`](xb_site::PageRenderer),
//! so nothing but the filesystem is shared between requests.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use xb_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 8080,
//!         public_dir: PathBuf::from("site/httpdocs"),
//!         config_dir: PathBuf::from("site/config"),
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (xb-server)
//!                        │
//!                        ├─► Page routes ──► spawn_blocking ──► PageRenderer::render
//!                        │
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use state::AppState;
use xb_site::PageRendererConfig;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Site base path (content, layouts, menus, static assets).
    pub public_dir: PathBuf,
    /// Site config directory (`config.toml`, `local.toml`).
    pub config_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_dir: PathBuf::from("site/httpdocs"),
            config_dir: PathBuf::from("site/config"),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        renderer_config: PageRendererConfig {
            base_path: config.public_dir.clone(),
            config_dir: config.config_dir.clone(),
        },
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from xb config.
#[must_use]
pub fn server_config_from_xb_config(config: &xb_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        public_dir: config.site_resolved.public_dir.clone(),
        config_dir: config.site_resolved.config_dir.clone(),
    }
}
