//! Connection configuration model.

use crate::error::{DbError, DbResult};

/// DSN understood by DuckDB as a private in-memory database.
pub const IN_MEMORY_DSN: &str = ":memory:";

/// Optional scheme prefix accepted on DSNs (`duckdb:path/to/file.db`).
const DSN_PREFIX: &str = "duckdb:";

/// Validated settings for opening the database handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Normalized data-source string: `:memory:` or a file path.
    pub dsn: String,
    /// Open the database file in read-only access mode.
    pub read_only: bool,
}

impl ConnectionConfig {
    /// Parse a DSN from CLI/env input.
    ///
    /// # Format
    ///
    /// ```text
    /// (empty)                 # in-memory
    /// :memory:                # in-memory
    /// data/warehouse.duckdb   # file, created if missing
    /// duckdb:data/w.duckdb    # same, with optional scheme prefix
    /// ```
    pub fn parse(dsn: &str, read_only: bool) -> DbResult<Self> {
        let trimmed = dsn.trim();
        let stripped = trimmed.strip_prefix(DSN_PREFIX).unwrap_or(trimmed).trim();
        let dsn = if stripped.is_empty() {
            IN_MEMORY_DSN.to_string()
        } else {
            stripped.to_string()
        };

        if read_only && dsn == IN_MEMORY_DSN {
            return Err(DbError::invalid_input(
                "read-only mode requires a database file; an in-memory database starts empty",
            ));
        }

        Ok(Self { dsn, read_only })
    }

    /// In-memory configuration, used by tests and as the default.
    pub fn in_memory() -> Self {
        Self {
            dsn: IN_MEMORY_DSN.to_string(),
            read_only: false,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.dsn == IN_MEMORY_DSN
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}
