//! HTTP boundary for the Courier broker.
//!
//! Exposes the three broker operations as REST routes: `/run-command`
//! for submitters, `/commands` and `/results` for agents.

mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

pub use routes::SESSION_KEY_HEADER;
pub use state::SharedState;

/// Build the application router.
pub fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/run-command", post(routes::run_command))
        .route("/commands", get(routes::next_command))
        .route("/results", post(routes::post_result))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Handle to a running HTTP server.
pub struct HttpServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl HttpServerHandle {
    /// Check if the server is running.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Stop the server gracefully and wait for in-flight requests.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Start the HTTP server on the given host and port.
///
/// Binds immediately; the accept loop runs as a background task.
/// Returns a handle that can be used to stop the server.
pub async fn start(
    state: Arc<SharedState>,
    host: &str,
    port: u16,
) -> Result<HttpServerHandle, String> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    log::info!("HTTP server listening on http://{}", addr);

    let app = router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                log::info!("HTTP server shutting down");
            })
            .await
            .ok();
    });

    Ok(HttpServerHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ============================================================================
// TESTS
// ============================================================================
