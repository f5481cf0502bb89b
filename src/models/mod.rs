//! Data models for the DuckDB MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod ingest;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionConfig, IN_MEMORY_DSN};
pub use ingest::{CsvOptions, FileType, IngestionRequest, ReaderOptions};
pub use query::{DEFAULT_ROW_LIMIT, SAMPLE_ROW_LIMIT, TabularResult, effective_limit};
pub use schema::{ColumnInfo, TableDescription, TableInfo, TableKind};
