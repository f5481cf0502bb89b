//! Error types for the DuckDB MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Every variant belongs to one [`ErrorCategory`], which is what callers branch on
//! and what decides the MCP error code reported to the client.

use thiserror::Error;

/// Coarse error classification exposed at the tool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing/empty required field, unsupported file type. Never touches the database.
    Validation,
    /// A table or file does not exist.
    NotFound,
    /// The connection handle is closed or failed its liveness check.
    Connection,
    /// The engine rejected a statement or a cursor operation failed.
    Execution,
    /// Runtime failures unrelated to the engine (poisoned locks, join errors).
    Internal,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File does not exist: {path}")]
    FileNotFound { path: String },

    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database connection is closed")]
    ConnectionClosed,

    #[error("Execution failed: {message}")]
    Execution { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("{operation} failed: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<DbError>,
    },
}

impl DbError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a table not found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap this error with the name of the operation that produced it.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Self::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any operation context.
    pub fn root(&self) -> &DbError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::FileNotFound { .. } | Self::TableNotFound { .. } => ErrorCategory::NotFound,
            Self::Connection { .. } | Self::ConnectionClosed => ErrorCategory::Connection,
            Self::Execution { .. } => ErrorCategory::Execution,
            Self::Internal { .. } | Self::Context { .. } => ErrorCategory::Internal,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self.root() {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::ConnectionClosed => {
                Some("The server is shutting down; restart it to reconnect")
            }
            Self::TableNotFound { .. } => Some("Call list_tables to see available tables"),
            Self::FileNotFound { .. } => Some(
                "Check the path; relative paths resolve against the server's working directory",
            ),
            _ => None,
        }
    }
}

/// Engine errors carry the DuckDB message verbatim.
impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::execution(err.to_string())
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData by category.
/// Includes the suggestion field in the `data` object when available.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        let data = suggestion_data(err.suggestion());
        match err.category() {
            ErrorCategory::Validation => rmcp::ErrorData::invalid_params(err.to_string(), data),
            ErrorCategory::NotFound => rmcp::ErrorData::resource_not_found(err.to_string(), data),
            ErrorCategory::Connection | ErrorCategory::Execution | ErrorCategory::Internal => {
                rmcp::ErrorData::internal_error(err.to_string(), data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::connection("Failed to open", "Check the path");
        assert!(err.to_string().contains("Connection failed"));
        assert_eq!(
            DbError::ConnectionClosed.to_string(),
            "Database connection is closed"
        );
    }

    #[test]
    fn test_context_prefixes_operation() {
        let err = DbError::execution("Catalog Error: Table with name x does not exist!")
            .context("execute_query");
        assert_eq!(
            err.to_string(),
            "execute_query failed: Execution failed: Catalog Error: Table with name x does not exist!"
        );
    }

    #[test]
    fn test_category_looks_through_context() {
        let err = DbError::table_not_found("users")
            .context("describe_table")
            .context("tool");
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(matches!(err.root(), DbError::TableNotFound { .. }));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            DbError::invalid_input("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            DbError::file_not_found("a.csv").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            DbError::ConnectionClosed.category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            DbError::execution("bad").category(),
            ErrorCategory::Execution
        );
        assert_eq!(DbError::internal("x").category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = DbError::invalid_input("bad input").into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_not_found_maps_to_resource_not_found() {
        let mcp_err: rmcp::ErrorData = DbError::table_not_found("users").into();
        assert_eq!(mcp_err.code.0, -32002);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["suggestion"], "Call list_tables to see available tables");
    }

    #[test]
    fn test_execution_maps_to_internal_error() {
        let mcp_err: rmcp::ErrorData = DbError::execution("Parser Error").into();
        assert_eq!(mcp_err.code.0, -32603);
        assert!(mcp_err.message.contains("Parser Error"));
        assert!(mcp_err.data.is_none());
    }

    #[test]
    fn test_connection_error_includes_suggestion_in_data() {
        let mcp_err: rmcp::ErrorData = DbError::connection("failed", "try reopening").into();
        assert_eq!(mcp_err.code.0, -32603);
        assert_eq!(mcp_err.data.unwrap()["suggestion"], "try reopening");
    }
}
