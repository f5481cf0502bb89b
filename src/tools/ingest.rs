//! File ingestion tool.
//!
//! Implements `create_table_from_file`: materializes a CSV, Parquet or JSON
//! file as a new table in the main schema.

use crate::db::{ConnectionManager, IngestionPlanner};
use crate::error::DbResult;
use crate::models::IngestionRequest;
use crate::tools::require;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::info;

/// Input for the create_table_from_file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTableFromFileInput {
    /// Name of the table to create. Must not already exist.
    pub table_name: String,
    /// Path to the source file. Relative paths resolve against the server's working directory.
    pub file_path: String,
    /// "csv", "parquet" or "json". Inferred from the file extension when omitted.
    #[serde(default)]
    pub file_type: Option<String>,
    /// Reader options. CSV recognizes `header` (bool, default true) and `delimiter` (string, default ",").
    #[serde(default)]
    pub options: Option<Map<String, JsonValue>>,
}

/// Output from the create_table_from_file tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreateTableFromFileOutput {
    pub table_name: String,
    /// Rows loaded into the new table
    pub row_count: u64,
    pub message: String,
    /// File type used to read the source
    pub file_type: String,
    /// Source file size in bytes
    pub file_size: u64,
    pub file_size_formatted: String,
}

/// Format bytes as human-readable size string (1024-based units).
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::WINDOWS)
}

pub struct IngestToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl IngestToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn create_table_from_file(
        &self,
        input: CreateTableFromFileInput,
    ) -> DbResult<CreateTableFromFileOutput> {
        let table_name = require("table_name", &input.table_name)?;
        let file_path = require("file_path", &input.file_path)?;

        let request = IngestionRequest {
            table_name,
            file_path,
            file_type: input.file_type,
            options: input.options.unwrap_or_default(),
        };

        // Validation and the file check happen before the blocking hop.
        let plan = IngestionPlanner::plan(&request)?;
        let summary = self
            .connection_manager
            .run_blocking(move |db| IngestionPlanner::execute(db, &plan))
            .await?;

        info!(
            table = %summary.table_name,
            rows = summary.row_count,
            "Ingested file"
        );

        Ok(CreateTableFromFileOutput {
            table_name: summary.table_name,
            row_count: summary.row_count,
            message: summary.message,
            file_type: summary.file_type.to_string(),
            file_size: summary.file_size,
            file_size_formatted: format_size(summary.file_size),
        })
    }
}
