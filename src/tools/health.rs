//! Health check tool.

use crate::db::ConnectionManager;
use crate::error::DbResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_PING_MESSAGE: &str = "ping";

/// Input for the ping tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PingInput {
    /// Message to echo back. Default: "ping"
    #[serde(default)]
    pub message: Option<String>,
}

/// Output from the ping tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PingOutput {
    /// "pong: " followed by the echoed message
    pub response: String,
    /// Always "healthy" on success
    pub status: String,
}

pub struct HealthToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl HealthToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Check the connection, then echo the message.
    pub async fn ping(&self, input: PingInput) -> DbResult<PingOutput> {
        self.connection_manager.run_blocking(|db| db.ping()).await?;

        let message = input
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_PING_MESSAGE.to_string());

        debug!(message = %message, "Ping");

        Ok(PingOutput {
            response: format!("pong: {message}"),
            status: "healthy".to_string(),
        })
    }
}
