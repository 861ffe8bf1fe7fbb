//! Same-origin reverse proxy for the HRIS web client.
//!
//! - Any method on `/api/*` is forwarded to the backend with the prefix
//!   rewritten (`/api` -> `/v1` by default). Headers and body pass through;
//!   the upstream Host comes from the target URL.
//! - An unreachable or failing upstream yields
//!   `500 {"error": "Proxy error", "details": ...}`.
//! - Everything else is served from the static directory, falling back to
//!   `index.html` so client-side routes resolve.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::any, Router};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

pub mod config;
pub mod error;
pub mod proxy;

pub use config::ProxyConfig;
use proxy::{proxy_handler, ProxyState};

pub fn router(state: Arc<ProxyState>) -> Router {
    let prefix = state.config.prefix.clone();

    // An empty prefix forwards everything and serves no static files.
    let app = if prefix.is_empty() {
        Router::new().fallback(proxy_handler)
    } else {
        let static_dir = &state.config.static_dir;
        let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
        Router::new()
            .route(&prefix, any(proxy_handler))
            .route(&format!("{prefix}/{{*path}}"), any(proxy_handler))
            .fallback_service(spa)
    };

    app.with_state(state)
}

pub async fn start_server(config: ProxyConfig) -> Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let state = ProxyState::new(config).context("Failed to build upstream client")?;
    let app = router(state.clone());

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("HRIS server running on port {}", state.config.port);
    info!("Frontend: http://localhost:{}", state.config.port);
    info!(
        "API proxy: {} -> {}{}",
        state.config.prefix, state.config.target, state.config.rewrite
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
