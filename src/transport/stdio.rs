//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout. Logs
//! go to stderr so stdout carries protocol traffic only.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::TableService;
use crate::transport::{CLOSE_TIMEOUT, Transport, close_database, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

pub struct StdioTransport {
    connection_manager: Arc<ConnectionManager>,
}

impl StdioTransport {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!(dsn = %self.connection_manager.dsn(), "Starting MCP server with stdio transport");

        let service = TableService::new(self.connection_manager.clone());
        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {e}")))?;

        let outcome = tokio::select! {
            result = running_service.waiting() => match result {
                Ok(reason) => {
                    info!(reason = ?reason, "Stdio transport completed");
                    Ok(false)
                }
                Err(e) => {
                    warn!(error = %e, "Stdio transport error");
                    Err(DbError::internal(format!("Stdio transport error: {e}")))
                }
            },
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                Ok(true)
            }
        };

        if matches!(outcome, Ok(true)) {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        // The runtime would wait on running statements when dropped.
        if !close_database(&self.connection_manager, CLOSE_TIMEOUT).await {
            warn!("Exiting with statements still running");
            std::process::exit(1);
        }

        match outcome {
            // A blocking stdin read cannot be interrupted, so leave the process directly.
            Ok(true) => {
                info!("Exiting process");
                std::process::exit(0);
            }
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}
