//! Standings node - the main application entry point.
//!
//! Architecture:
//! - One registry per process, seeded before the server accepts requests
//! - Shared with every HTTP handler behind a single reader/writer lock

use crate::api;
use crate::config::NodeConfig;
use crate::error::Result;
use axum::Router;
use standings_registry::Registry;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// Shared state for the node - one registry shared by all handlers.
pub struct AppState {
    /// Reads take the shared side, `bulk_rerate` the exclusive side.
    pub registry: RwLock<Registry>,
    pub config: NodeConfig,
}

impl AppState {
    /// Wrap an already seeded registry.
    pub fn new(registry: Registry, config: NodeConfig) -> Self {
        Self {
            registry: RwLock::new(registry),
            config,
        }
    }
}

/// Handle to the shared state passed to handlers.
pub type SharedState = Arc<AppState>;

/// A standings node instance.
pub struct StandingsNode {
    state: SharedState,
    config: NodeConfig,
}

impl StandingsNode {
    /// Create a node and seed its registry from the config.
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate()?;

        // Seeded before the state is shared, so no lock is needed yet
        let mut registry = Registry::new();
        registry.seed(config.seed_count, config.score_min, config.score_max)?;

        Ok(Self::with_registry(registry, config))
    }

    /// Create a node around an existing registry.
    pub fn with_registry(registry: Registry, config: NodeConfig) -> Self {
        let state = Arc::new(AppState::new(registry, config.clone()));
        Self { state, config }
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Build the HTTP router over this node's state.
    pub fn router(&self) -> Router {
        api::build_router(self.state())
    }

    /// Run the node until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Standings node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!(
            "  Registry: {} entries, scores {}..={}",
            self.config.seed_count,
            self.config.score_min,
            self.config.score_max
        );
        tracing::info!(
            "  Defaults: leaderboard {} entries, update batch {}",
            self.config.leaderboard_size,
            self.config.update_batch
        );

        let listener = TcpListener::bind(self.config.api_addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("HTTP server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Standings node stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn small_config() -> NodeConfig {
        NodeConfig {
            seed_count: 25,
            score_min: 1,
            score_max: 10,
            ..NodeConfig::default()
        }
    }

    async fn http_get(addr: std::net::SocketAddr, path: &str) -> (String, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        (head.to_string(), body.to_string())
    }

    #[test]
    fn new_seeds_registry() {
        let node = StandingsNode::new(small_config()).unwrap();
        let state = node.state();
        let registry = state.registry.try_read().unwrap();
        assert_eq!(registry.len(), 25);
        assert!(registry.is_seeded());
    }

    #[test]
    fn new_rejects_inverted_range() {
        let config = NodeConfig {
            score_min: 10,
            score_max: 1,
            ..small_config()
        };
        assert!(StandingsNode::new(config).is_err());
    }

    #[tokio::test]
    async fn serves_leaderboard_over_http() {
        let node = StandingsNode::new(small_config()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(node.serve(listener, async move {
            let _ = stop_rx.await;
        }));

        let (head, body) = http_get(addr, "/leaderboard?limit=3").await;
        assert!(head.starts_with("HTTP/1.1 200"), "{}", head);
        let users: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0]["rank"], 1);
        assert!(users[0]["username"].as_str().unwrap().starts_with("user_"));

        let (head, body) = http_get(addr, "/health").await;
        assert!(head.starts_with("HTTP/1.1 200"), "{}", head);
        assert_eq!(body, "OK");

        let (head, _) = http_get(addr, "/users/user_999").await;
        assert!(head.starts_with("HTTP/1.1 404"), "{}", head);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bad_requests_get_json_errors() {
        let node = StandingsNode::new(small_config()).unwrap();
        let state = node.state();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(node.serve(listener, async move {
            let _ = stop_rx.await;
        }));

        for path in [
            "/leaderboard?limit=abc",
            "/update?count=x",
            "/update?count=-3",
            "/update?count=9223372036854775807",
        ] {
            let (head, body) = http_get(addr, path).await;
            assert!(head.starts_with("HTTP/1.1 400"), "{}: {}", path, head);
            assert!(
                head.to_ascii_lowercase().contains("content-type: application/json"),
                "{}: {}",
                path,
                head
            );
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert!(json["error"].as_str().is_some(), "{}: {}", path, body);
        }
        assert_eq!(state.registry.read().await.generation(), 1);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
