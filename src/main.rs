//! DuckDB MCP Server - Main entry point.

use clap::Parser;
use duckdb_mcp_server::config::{Config, TransportMode};
use duckdb_mcp_server::db::ConnectionManager;
use duckdb_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber. Output goes to stderr; stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting DuckDB MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Nothing is served unless the database opens.
    let connection_config = config.connection_config()?;
    let connection_manager = match ConnectionManager::open(connection_config) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!(error = %e, "Failed to open database");
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Error: {e}\n  {suggestion}");
            }
            return Err(e.into());
        }
    };

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(connection_manager).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                connection_manager,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
