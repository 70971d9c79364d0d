//! Keep-alive HTTP endpoint powered by axum.
//!
//! Serves a single route, `GET /`, so hosting platforms can tell the process
//! is up whether or not the bot is connected to Telegram.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const ALIVE_MESSAGE: &str = "File Share Bot is alive!";

pub fn build_router() -> Router {
    Router::new().route("/", get(alive))
}

/// Serve until `shutdown` is cancelled.
///
/// Usually started through [`spawn`].
pub async fn serve(addr: SocketAddr, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("keep-alive server listening on http://{}", addr);

    axum::serve(listener, build_router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("keep-alive server stopped");
    Ok(())
}

/// Run `serve` on its own task. A failure is logged as soon as it happens.
pub fn spawn(addr: SocketAddr, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(addr, shutdown).await {
            tracing::error!(%addr, error = %e, "keep-alive server failed");
        }
    })
}

/// GET /: liveness ping.
async fn alive() -> &'static str {
    tracing::info!("keep-alive endpoint pinged");
    ALIVE_MESSAGE
}
