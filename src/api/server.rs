//! HTTP server lifecycle — binds the listener, mounts `api_router()`, and
//! runs the axum server in a background task with a graceful-shutdown
//! channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::app_state::AppState;

/// Handle to a running server.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }
}

/// Bind the given address and spawn the server in a background tokio task.
/// Port 0 picks an ephemeral port; the bound address is on the handle.
pub async fn start_server(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Result<ServerHandle, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Server received shutdown signal");
        };

        tracing::info!(%addr, "Server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Server error: {e}");
        }

        tracing::info!("Server stopped");
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn start_test_server() -> (ServerHandle, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().join("test.db")));
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let handle = start_server(state, addr).await.expect("server should start");
        (handle, dir)
    }

    /// Minimal raw-socket HTTP GET, enough to exercise the listener
    /// without pulling an HTTP client into the dev-dependencies.
    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn serves_the_root_banner() {
        let (mut handle, _dir) = start_test_server().await;

        let response = http_get(handle.addr, "/").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("running"));

        handle.shutdown();
    }

    #[tokio::test]
    async fn protected_route_rejects_anonymous_requests() {
        let (mut handle, _dir) = start_test_server().await;

        let response = http_get(handle.addr, "/api/patients").await;
        assert!(response.starts_with("HTTP/1.1 401"));

        handle.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (mut handle, _dir) = start_test_server().await;
        handle.shutdown();
        handle.shutdown(); // Second call should be safe
    }
}
