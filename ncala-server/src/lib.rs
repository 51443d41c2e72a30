//! NCALA Server - match hosting for two-player sowing duels
//!
//! This crate provides the networked side of the game:
//! - Invite-code match registry
//! - Session controller and per-seat state broadcast
//! - WebSocket endpoint carrying the JSON protocol
//! - Health/status endpoints and static file serving

pub mod broadcast;
pub mod invite;
pub mod protocol;
pub mod registry;
pub mod session;
mod routes;
mod state;

use axum::{response::Redirect, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub use registry::{ConnectionId, MatchRegistry, MatchStatus};
pub use session::{SessionController, SessionError};
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    /// Mount point for everything but the root health check, e.g. `/ncala`
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: "public".to_string(),
            base_path: String::new(),
        }
    }
}

/// Canonical mount point: empty, or a single leading slash and no trailing one
pub fn normalize_base_path(value: &str) -> String {
    let segments: Vec<&str> = value
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    let app = Router::new()
        // Game socket
        .route("/ws", get(routes::socket::socket_handler))
        // Health/status
        .route("/health", get(routes::status::health_handler))
        .route("/api/status", get(routes::status::status_handler))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service);

    let base_path = normalize_base_path(&config.base_path);
    if base_path.is_empty() {
        return app;
    }

    let target = base_path.clone();
    Router::new()
        .route(
            "/",
            get(move || std::future::ready(Redirect::to(&target))),
        )
        .route("/health", get(routes::status::health_handler))
        .nest(&base_path, app)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new());
    let router = create_router(&config, state);
    let base_path = normalize_base_path(&config.base_path);

    tracing::info!(
        "NCALA server listening on http://0.0.0.0:{}{}",
        config.port,
        if base_path.is_empty() { "/" } else { base_path.as_str() }
    );
    tracing::info!("Socket path set to {}/ws", base_path);
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("   "), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("ncala"), "/ncala");
        assert_eq!(normalize_base_path("/ncala/"), "/ncala");
        assert_eq!(normalize_base_path(" //games//ncala// "), "/games/ncala");
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.base_path.is_empty());
    }
}
