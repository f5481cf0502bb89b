//! Ingestion planning.
//!
//! Turns an [`IngestionRequest`] into a single `CREATE TABLE ... AS SELECT`
//! over one of DuckDB's file reader functions, then counts what was loaded.

use crate::db::connection::ConnectionManager;
use crate::db::sql::{count_rows, quote_identifier, quote_literal};
use crate::error::{DbError, DbResult};
use crate::models::{FileType, IngestionRequest, ReaderOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A validated ingestion, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionPlan {
    pub table_name: String,
    /// Absolute path embedded in the statement.
    pub path: PathBuf,
    pub reader: ReaderOptions,
    /// Source size in bytes at planning time.
    pub file_size: u64,
    pub sql: String,
}

impl IngestionPlan {
    pub fn file_type(&self) -> FileType {
        self.reader.file_type()
    }
}

/// Result of a completed ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    pub table_name: String,
    pub file_path: String,
    pub file_type: FileType,
    pub file_size: u64,
    pub row_count: u64,
    pub message: String,
}

pub struct IngestionPlanner;

impl IngestionPlanner {
    /// Validate the request and build the statement.
    ///
    /// Checks run in order: required fields, file existence, file type. No SQL
    /// is executed here.
    pub fn plan(request: &IngestionRequest) -> DbResult<IngestionPlan> {
        let table_name = request.table_name.trim();
        if table_name.is_empty() {
            return Err(DbError::invalid_input("table_name is required"));
        }
        if request.file_path.trim().is_empty() {
            return Err(DbError::invalid_input("file_path is required"));
        }

        let path = std::path::absolute(Path::new(request.file_path.trim()))
            .map_err(|e| DbError::invalid_input(format!("invalid file_path: {e}")))?;

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DbError::file_not_found(path.display().to_string()));
            }
            Err(e) => {
                return Err(DbError::invalid_input(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        if !metadata.is_file() {
            return Err(DbError::invalid_input(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let file_type = request.resolve_file_type()?;
        let reader = ReaderOptions::for_file_type(file_type, &request.options);
        let sql = Self::create_table_sql(table_name, &path, &reader)?;

        Ok(IngestionPlan {
            table_name: table_name.to_string(),
            path,
            reader,
            file_size: metadata.len(),
            sql,
        })
    }

    /// `CREATE TABLE "<name>" AS SELECT * FROM <reader>('<path>'[, options])`.
    pub fn create_table_sql(
        table_name: &str,
        path: &Path,
        reader: &ReaderOptions,
    ) -> DbResult<String> {
        let path = path.to_str().ok_or_else(|| {
            DbError::invalid_input(format!("file path is not valid UTF-8: {}", path.display()))
        })?;

        let mut args = vec![quote_literal(path)];
        if let ReaderOptions::Csv(csv) = reader {
            args.push(format!("header = {}", csv.header));
            args.push(format!("delim = {}", quote_literal(&csv.delimiter)));
        }

        Ok(format!(
            "CREATE TABLE {} AS SELECT * FROM {}({})",
            quote_identifier(table_name),
            reader.file_type().reader_function(),
            args.join(", ")
        ))
    }

    /// Run a plan and count the rows it loaded.
    ///
    /// A failed count is an error; the table stays in place.
    pub fn execute(db: &ConnectionManager, plan: &IngestionPlan) -> DbResult<IngestionSummary> {
        debug!(table = %plan.table_name, sql = %plan.sql, "Creating table from file");
        db.exec(&plan.sql, &[])?;

        let row_count = db.query_count(&count_rows(&plan.table_name), &[])?;
        let file_path = plan.path.display().to_string();

        info!(
            table = %plan.table_name,
            file_type = %plan.file_type(),
            rows = row_count,
            "Created table from file"
        );

        Ok(IngestionSummary {
            message: format!(
                "Successfully created table '{}' from file '{}' with {} rows",
                plan.table_name, file_path, row_count
            ),
            table_name: plan.table_name.clone(),
            file_path,
            file_type: plan.file_type(),
            file_size: plan.file_size,
            row_count,
        })
    }

    /// Plan and execute in one step.
    pub fn ingest(db: &ConnectionManager, request: &IngestionRequest) -> DbResult<IngestionSummary> {
        let plan = Self::plan(request)?;
        Self::execute(db, &plan)
    }
}
