//! Transport layer for the MCP server.
//!
//! - Stdio: JSON-RPC over standard input/output, the default for local clients
//! - HTTP: Streamable HTTP for networked clients
//!
//! Each runner owns the shutdown hook and closes the [`ConnectionManager`]
//! once serving ends.
//!
//! [`ConnectionManager`]: crate::db::ConnectionManager

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::db::ConnectionManager;
use crate::error::DbResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// How long shutdown waits for in-flight statements before giving up on `close`.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for MCP transport implementations.
pub trait Transport: Send + Sync {
    /// Serve until the client disconnects or a shutdown signal arrives.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}

/// Wait for SIGINT or SIGTERM.
///
/// If a handler cannot be installed that source is logged and never fires.
pub(crate) async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Close the database off the async workers, waiting at most `wait`.
///
/// `close` blocks until running statements finish. Returns false when it is
/// still waiting after `wait`; the caller should then exit the process.
pub(crate) async fn close_database(manager: &Arc<ConnectionManager>, wait: Duration) -> bool {
    info!("Closing database");
    let db = manager.clone();
    let closing = tokio::task::spawn_blocking(move || db.close());
    match tokio::time::timeout(wait, closing).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!(error = %e, "Database close task failed");
            false
        }
        Err(_) => {
            warn!(
                timeout_secs = wait.as_secs(),
                "Statements still running; abandoning database close"
            );
            false
        }
    }
}
