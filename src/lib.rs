//! DuckDB MCP Server Library
//!
//! MCP (Model Context Protocol) tools for AI assistants to load data files
//! into an embedded DuckDB database and query them with SQL.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use db::ConnectionManager;
pub use error::{DbError, DbResult, ErrorCategory};
pub use mcp::TableService;
