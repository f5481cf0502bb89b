//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `health`: Connection liveness check (`ping`)
//! - `ingest`: Load a CSV, Parquet or JSON file as a table
//! - `schema`: List tables and describe a table
//! - `query`: Run arbitrary SQL with a bounded result
//! - `format`: ASCII and Markdown rendering of tabular results

pub mod format;
pub mod health;
pub mod ingest;
pub mod query;
pub mod schema;

pub use format::OutputFormat;
pub use health::{HealthToolHandler, PingInput, PingOutput};
pub use ingest::{CreateTableFromFileInput, CreateTableFromFileOutput, IngestToolHandler};
pub use query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
pub use schema::{DescribeTableInput, DescribeTableOutput, ListTablesOutput, SchemaToolHandler};

use crate::error::{DbError, DbResult};

/// Trim a required string field, rejecting it when empty.
pub(crate) fn require(field: &str, value: &str) -> DbResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DbError::invalid_input(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_trims() {
        assert_eq!(require("table_name", "  trips ").unwrap(), "trips");
    }

    #[test]
    fn test_require_rejects_blank() {
        let err = require("query", " \n\t").unwrap_err();
        assert!(err.to_string().contains("query is required"));
    }
}
