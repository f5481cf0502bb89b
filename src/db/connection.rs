//! Connection management.
//!
//! The server owns exactly one DuckDB database handle. Statement execution takes
//! a shared lock on the handle and runs on a cloned connection to the same
//! database, leaving the engine's own concurrency control to order statements.
//! `close` takes the exclusive lock, so it waits for in-flight statements and
//! every later call fails with [`DbError::ConnectionClosed`].

use crate::db::cursor::{DuckDbCursor, RowCursor};
use crate::error::{DbError, DbResult};
use crate::models::ConnectionConfig;
use duckdb::types::Value;
use duckdb::{AccessMode, Config, Connection, params_from_iter};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Owner of the single database handle.
pub struct ConnectionManager {
    handle: RwLock<Option<Mutex<Connection>>>,
    config: ConnectionConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("dsn", &self.config.dsn)
            .field("read_only", &self.config.read_only)
            .field("open", &self.is_open())
            .finish()
    }
}

impl ConnectionManager {
    /// Open the database and check it once.
    ///
    /// A handle that fails the check is released before the error is returned.
    pub fn open(config: ConnectionConfig) -> DbResult<Self> {
        let conn = Self::connect(&config)?;

        if let Err(e) = Self::check_liveness(&conn) {
            drop(conn);
            return Err(DbError::connection(
                format!("liveness check failed for '{}': {}", config.dsn, e),
                "Check that the database file is a valid DuckDB database",
            ));
        }

        info!(
            dsn = %config.dsn,
            read_only = config.read_only,
            "Opened DuckDB database"
        );

        Ok(Self {
            handle: RwLock::new(Some(Mutex::new(conn))),
            config,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(ConnectionConfig::in_memory())
    }

    fn connect(config: &ConnectionConfig) -> DbResult<Connection> {
        let mut flags = Config::default();
        if config.read_only {
            flags = flags.access_mode(AccessMode::ReadOnly)?;
        }

        let opened = if config.is_in_memory() {
            Connection::open_in_memory_with_flags(flags)
        } else {
            Connection::open_with_flags(&config.dsn, flags)
        };

        opened.map_err(|e| {
            DbError::connection(
                format!("failed to open DuckDB database '{}': {}", config.dsn, e),
                "Check the database path and that no other process holds a write lock on it",
            )
        })
    }

    fn check_liveness(conn: &Connection) -> DbResult<()> {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;
        Ok(())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn dsn(&self) -> &str {
        &self.config.dsn
    }

    /// Whether the handle is still live.
    pub fn is_open(&self) -> bool {
        match self.handle.read() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Run `f` on a connection to the shared database while holding the shared lock.
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self
            .handle
            .read()
            .map_err(|_| DbError::internal("connection lock poisoned"))?;
        let shared = guard.as_ref().ok_or(DbError::ConnectionClosed)?;

        let conn = {
            let base = shared
                .lock()
                .map_err(|_| DbError::internal("connection mutex poisoned"))?;
            base.try_clone()?
        };

        f(&conn)
    }

    /// Execute a statement that returns rows and hand its cursor to `f`.
    ///
    /// The cursor borrows the statement, so it only lives for the duration of `f`.
    pub fn query<T>(
        &self,
        sql: &str,
        params: &[Value],
        f: impl FnOnce(&mut dyn RowCursor) -> DbResult<T>,
    ) -> DbResult<T> {
        debug!(sql = %sql, params = params.len(), "Executing query");
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query(params_from_iter(params.iter()))?;
            let mut cursor = DuckDbCursor::new(rows);
            f(&mut cursor)
        })
    }

    /// Execute a statement and return the number of affected rows.
    pub fn exec(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        debug!(sql = %sql, params = params.len(), "Executing statement");
        self.with_connection(|conn| Ok(conn.execute(sql, params_from_iter(params.iter()))?))
    }

    /// Run a query whose first column of the first row is an integer count.
    pub fn query_count(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        debug!(sql = %sql, "Executing count query");
        self.with_connection(|conn| {
            let count: i64 =
                conn.query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| DbError::execution(format!("count query returned {count}")))
        })
    }

    /// Check that the handle is open and the engine answers.
    pub fn ping(&self) -> DbResult<()> {
        self.with_connection(|conn| {
            Self::check_liveness(conn).map_err(|e| {
                DbError::connection(
                    format!("liveness check failed: {e}"),
                    "Restart the server to reopen the database",
                )
            })
        })
    }

    /// Release the handle. Safe to call any number of times.
    pub fn close(&self) {
        let mut guard = match self.handle.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(shared) = guard.take() else {
            debug!("Database already closed");
            return;
        };

        let conn = match shared.into_inner() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };

        match conn.close() {
            Ok(()) => info!(dsn = %self.config.dsn, "Closed DuckDB database"),
            Err((_, e)) => warn!(error = %e, "Error while closing DuckDB database"),
        }
    }

    /// Run blocking engine work on tokio's blocking pool.
    pub async fn run_blocking<F, T>(self: &Arc<Self>, f: F) -> DbResult<T>
    where
        F: FnOnce(&ConnectionManager) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let manager = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&manager))
            .await
            .map_err(|e| DbError::internal(format!("blocking task failed: {e}")))?
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::marshal::marshal;
    use crate::error::ErrorCategory;
    use std::thread;

    #[test]
    fn test_open_in_memory_and_ping() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        assert!(manager.is_open());
        assert!(manager.ping().is_ok());
        assert_eq!(manager.dsn(), ":memory:");
    }

    #[test]
    fn test_exec_and_query() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        manager
            .exec("CREATE TABLE t (id INTEGER, name VARCHAR)", &[])
            .unwrap();
        let inserted = manager
            .exec(
                "INSERT INTO t VALUES (?, ?), (2, NULL)",
                &[Value::Int(1), Value::Text("a".to_string())],
            )
            .unwrap();
        assert_eq!(inserted, 2);

        let result = manager
            .query("SELECT id, name FROM t ORDER BY id", &[], |cursor| {
                marshal(cursor, 10)
            })
            .unwrap();
        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(result.text_rows(), vec![vec!["1", "a"], vec!["2", "NULL"]]);
        assert_eq!(manager.query_count("SELECT COUNT(*) FROM t", &[]).unwrap(), 2);
    }

    #[test]
    fn test_tables_visible_across_calls() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        manager.exec("CREATE TABLE shared AS SELECT 42 AS x", &[]).unwrap();
        assert_eq!(
            manager.query_count("SELECT COUNT(*) FROM shared", &[]).unwrap(),
            1
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        manager.close();
        manager.close();
        assert!(!manager.is_open());
    }

    #[test]
    fn test_operations_after_close_fail_with_connection_error() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        manager.close();

        let err = manager.exec("SELECT 1", &[]).unwrap_err();
        assert!(matches!(err, DbError::ConnectionClosed));
        let err = manager
            .query("SELECT 1", &[], |cursor| marshal(cursor, 1))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Connection);
        assert_eq!(
            manager.ping().unwrap_err().category(),
            ErrorCategory::Connection
        );
    }

    #[test]
    fn test_engine_errors_are_execution_errors() {
        let manager = ConnectionManager::open_in_memory().unwrap();
        let err = manager.exec("SELEC 1", &[]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Execution);
    }

    #[test]
    fn test_concurrent_queries() {
        let manager = Arc::new(ConnectionManager::open_in_memory().unwrap());
        manager
            .exec("CREATE TABLE nums AS SELECT * FROM range(1000) t(n)", &[])
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.query_count("SELECT COUNT(*) FROM nums", &[]))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1000);
        }
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.duckdb");
        let config = ConnectionConfig::parse(path.to_str().unwrap(), false).unwrap();

        let manager = ConnectionManager::open(config.clone()).unwrap();
        manager.exec("CREATE TABLE kept AS SELECT 1 AS x", &[]).unwrap();
        manager.close();

        let reopened = ConnectionManager::open(config).unwrap();
        assert_eq!(
            reopened.query_count("SELECT COUNT(*) FROM kept", &[]).unwrap(),
            1
        );
    }

    #[test]
    fn test_read_only_missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.duckdb");
        let config = ConnectionConfig::parse(path.to_str().unwrap(), true).unwrap();
        let err = ConnectionManager::open(config).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[tokio::test]
    async fn test_run_blocking() {
        let manager = Arc::new(ConnectionManager::open_in_memory().unwrap());
        let count = manager
            .run_blocking(|db| db.query_count("SELECT COUNT(*) FROM range(7)", &[]))
            .await
            .unwrap();
        assert_eq!(count, 7);
    }
}
