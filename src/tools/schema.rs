//! Schema introspection tools.
//!
//! This module implements the `list_tables` and `describe_table` MCP tools.

use crate::db::{ConnectionManager, SchemaInspector};
use crate::error::DbResult;
use crate::models::{ColumnInfo, TableInfo};
use crate::tools::require;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Output from the list_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    /// Tables and views in the main schema, ordered by name
    pub tables: Vec<TableInfo>,
    /// Total number of tables/views returned
    pub count: usize,
}

/// Input for the describe_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Table or view name, matched exactly (case-sensitive)
    pub table_name: String,
}

/// Output from the describe_table tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DescribeTableOutput {
    pub table_name: String,
    /// Columns in declared order
    pub columns: Vec<ColumnInfo>,
    /// Up to 5 rows rendered as strings; NULL cells read "NULL"
    pub sample_data: Vec<Vec<String>>,
}

pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl SchemaToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn list_tables(&self) -> DbResult<ListTablesOutput> {
        let tables = self
            .connection_manager
            .run_blocking(SchemaInspector::list_tables)
            .await?;
        let count = tables.len();

        info!(count = count, "Listed tables");

        Ok(ListTablesOutput { tables, count })
    }

    pub async fn describe_table(&self, input: DescribeTableInput) -> DbResult<DescribeTableOutput> {
        let table_name = require("table_name", &input.table_name)?;

        let description = self
            .connection_manager
            .run_blocking(move |db| SchemaInspector::describe_table(db, &table_name))
            .await?;

        info!(
            table = %description.table_name,
            columns = description.columns.len(),
            "Described table"
        );

        Ok(DescribeTableOutput {
            table_name: description.table_name,
            columns: description.columns,
            sample_data: description.sample_rows,
        })
    }
}
