//! HTTP surface: MCP over streamable HTTP at `/mcp`, liveness at `/health`.

use crate::adapter::ContentAdapter;
use crate::error::{AdapterError, Result};
use crate::session_manager::ContentSessionManager;
use crate::settings::ServerSettings;
use crate::tools::ContentTools;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build the application router. Every MCP session gets its own [`ContentTools`] over the
/// shared adapter.
pub fn router(adapter: Arc<ContentAdapter>) -> Router {
    let sessions = Arc::new(ContentSessionManager::default());
    let mcp = StreamableHttpService::new(
        move || Ok(ContentTools::new(Arc::clone(&adapter))),
        Arc::clone(&sessions),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .with_state(sessions)
}

async fn health(State(sessions): State<Arc<ContentSessionManager>>) -> Json<Value> {
    Json(json!({ "status": "ok", "sessions": sessions.open_sessions() }))
}

/// Start the adapter, serve until Ctrl-C / SIGTERM, then stop it.
///
/// # Errors
///
/// Returns an error if the upstream session cannot be built, the listener cannot be bound, or
/// the server fails while running.
pub async fn serve(settings: &ServerSettings) -> Result<()> {
    let adapter = Arc::new(ContentAdapter::new(settings.client.clone()));
    adapter.start().await?;

    let addr = settings.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            adapter.stop();
            return Err(AdapterError::Startup(format!("failed to bind {addr}: {e}")));
        }
    };
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "FDAPI MCP server listening; MCP endpoint at /mcp");

    let result = axum::serve(listener, router(Arc::clone(&adapter)))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    adapter.stop();
    info!("FDAPI MCP server stopped");
    result.map_err(AdapterError::Io)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
