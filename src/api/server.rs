//! API server lifecycle: bind → spawn background task → return handle
//! with a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    pub session_id: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Send the graceful-shutdown signal. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait until the server task has exited.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            tracing::error!("API server task failed: {e}");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve the API in a background task.
pub async fn start_server_on(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<ApiServer> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let app = api_router(ctx);
    let session_id = uuid::Uuid::new_v4().to_string();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        session_id,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Serve until Ctrl-C, then shut down gracefully.
pub async fn serve_until_ctrl_c(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<()> {
    let mut server = start_server_on(ctx, addr).await?;
    tracing::info!(addr = %server.addr, "Listening; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::orchestrator::tests::test_pipeline;

    fn ephemeral() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(Arc::new(test_pipeline(&dir.path().join("drift.log"))));
        let mut server = start_server_on(ctx, ephemeral())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);
        assert!(!server.session_id.is_empty());

        let url = format!("http://{}/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert!(resp.status().is_success());
        assert!(resp.headers().contains_key("x-request-id"));

        let url = format!("http://{}/api/v1/symptoms", server.addr);
        let resp = reqwest::Client::new()
            .post(&url)
            .json(&serde_json::json!({ "text": "headache and nausea" }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let json: serde_json::Value = resp.json().await.unwrap();
        assert!(!json["risk"].as_array().unwrap().is_empty());

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(Arc::new(test_pipeline(&dir.path().join("drift.log"))));
        let mut first = start_server_on(ctx.clone(), ephemeral()).await.unwrap();
        assert!(start_server_on(ctx, first.addr).await.is_err());
        first.shutdown();
    }
}
