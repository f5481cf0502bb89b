//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool. Any statement the
//! engine accepts is passed through; the result is bounded by `limit`.

use crate::db::{ConnectionManager, marshal};
use crate::error::DbResult;
use crate::models::{TabularResult, effective_limit};
use crate::tools::format::OutputFormat;
use crate::tools::require;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL statement to execute
    pub query: String,
    /// Maximum rows to return. Default: 100 (also used for zero or negative values)
    #[serde(default)]
    pub limit: Option<i64>,
    /// Output format: "json" returns structured data only, "table" and "markdown" also return a pre-rendered table
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output from the execute_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExecuteQueryOutput {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows rendered as strings; NULL cells read "NULL"
    pub data: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
    /// True if more rows existed beyond the limit
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Pre-formatted output when format is table or markdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl ExecuteQueryOutput {
    /// Create output from a marshalled result with the specified format.
    pub fn from_result(result: TabularResult, limit: usize, format: OutputFormat) -> Self {
        let formatted = format.render(&result);
        let message = result
            .truncated
            .then(|| format!("Results limited to {limit} rows"));

        Self {
            data: result.text_rows(),
            row_count: result.row_count(),
            truncated: result.truncated,
            columns: result.columns,
            message,
            formatted,
        }
    }
}

pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ExecuteQueryOutput> {
        let sql = require("query", &input.query)?;
        let limit = effective_limit(input.limit);

        let result = self
            .connection_manager
            .run_blocking(move |db| db.query(&sql, &[], |cursor| marshal(cursor, limit)))
            .await?;

        info!(
            rows = result.row_count(),
            truncated = result.truncated,
            limit = limit,
            "Executed query"
        );

        Ok(ExecuteQueryOutput::from_result(result, limit, input.format))
    }
}
