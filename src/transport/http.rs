//! HTTP transport with Streamable HTTP support for the MCP server.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::TableService;
use crate::transport::{CLOSE_TIMEOUT, Transport, close_database, wait_for_signal};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Streaming responses can hold the server open; give up waiting after this long.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);
const FORCED_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serves every session from one shared [`ConnectionManager`].
pub struct HttpTransport {
    connection_manager: Arc<ConnectionManager>,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            connection_manager,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the MCP endpoint path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn router(&self) -> axum::Router {
        let connection_manager = self.connection_manager.clone();
        let service = StreamableHttpService::new(
            move || Ok(TableService::new(connection_manager.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects the root path
        if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        }
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!(addr = %bind_addr, dsn = %self.connection_manager.dsn(), "Starting MCP server with HTTP transport");

        let app = self.router();

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {bind_addr}: {e}"),
                "Check that the port is available",
            )
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let notify = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            notify.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        let (result, forced) = tokio::select! {
            result = server => match result {
                Ok(()) => {
                    info!("HTTP server stopped");
                    (Ok(()), false)
                }
                Err(e) => {
                    error!(error = %e, "HTTP server error");
                    (Err(DbError::internal(format!("HTTP server error: {e}"))), false)
                }
            },
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)"
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => (Ok(()), true),
        };

        // Sessions abandoned by a forced stop may still have statements running,
        // and the runtime would wait on them when dropped.
        let wait = if forced { FORCED_CLOSE_TIMEOUT } else { CLOSE_TIMEOUT };
        if !close_database(&self.connection_manager, wait).await {
            warn!("Exiting with statements still running");
            std::process::exit(1);
        }
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> Arc<ConnectionManager> {
        Arc::new(ConnectionManager::open_in_memory().unwrap())
    }

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new(manager(), "127.0.0.1", 8080, "/mcp");
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.bind_addr(), "127.0.0.1:8080");
        assert_eq!(transport.endpoint(), "/mcp");
    }

    #[tokio::test]
    async fn test_bind_failure_is_connection_error() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let db = manager();
        let transport = HttpTransport::new(db.clone(), "127.0.0.1", port, "/");
        let err = transport.run().await.unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Connection);
        assert!(db.is_open());
    }
}
