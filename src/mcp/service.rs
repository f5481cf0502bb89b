//! MCP service implementation using rmcp.
//!
//! This module defines the TableService struct with all tools exposed via
//! the MCP protocol using the rmcp framework's macros. Every handler error is
//! wrapped with the tool name before it is reported to the client.

use crate::db::ConnectionManager;
use crate::error::DbError;
use crate::tools::health::{HealthToolHandler, PingInput, PingOutput};
use crate::tools::ingest::{CreateTableFromFileInput, CreateTableFromFileOutput, IngestToolHandler};
use crate::tools::query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
use crate::tools::schema::{
    DescribeTableInput, DescribeTableOutput, ListTablesOutput, SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::warn;

/// Attach the tool name to a handler error and convert it for the wire.
fn tool_error(operation: &'static str) -> impl FnOnce(DbError) -> McpError {
    move |err| {
        let err = err.context(operation);
        warn!(tool = operation, error = %err, "Tool call failed");
        McpError::from(err)
    }
}

#[derive(Clone)]
pub struct TableService {
    /// The one database handle, owned for the process lifetime
    connection_manager: Arc<ConnectionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl TableService {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl TableService {
    #[tool(
        description = "Check that the server and its database are alive.\nEchoes the optional message as \"pong: <message>\"."
    )]
    async fn ping(
        &self,
        Parameters(input): Parameters<PingInput>,
    ) -> Result<Json<PingOutput>, McpError> {
        HealthToolHandler::new(self.connection_manager.clone())
            .ping(input)
            .await
            .map(Json)
            .map_err(tool_error("ping"))
    }

    #[tool(
        description = "Create a table from a CSV, Parquet or JSON file.\nThe file type is inferred from the extension unless file_type is given.\nCSV options: header (bool, default true), delimiter (string, default \",\").\nReturns the number of rows loaded."
    )]
    async fn create_table_from_file(
        &self,
        Parameters(input): Parameters<CreateTableFromFileInput>,
    ) -> Result<Json<CreateTableFromFileOutput>, McpError> {
        IngestToolHandler::new(self.connection_manager.clone())
            .create_table_from_file(input)
            .await
            .map(Json)
            .map_err(tool_error("create_table_from_file"))
    }

    #[tool(description = "List all tables and views with their kind and row count.")]
    async fn list_tables(&self) -> Result<Json<ListTablesOutput>, McpError> {
        SchemaToolHandler::new(self.connection_manager.clone())
            .list_tables()
            .await
            .map(Json)
            .map_err(tool_error("list_tables"))
    }

    #[tool(
        description = "Get the columns (name, type, nullable) of a table or view in declared order, plus up to 5 sample rows."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Result<Json<DescribeTableOutput>, McpError> {
        SchemaToolHandler::new(self.connection_manager.clone())
            .describe_table(input)
            .await
            .map(Json)
            .map_err(tool_error("describe_table"))
    }

    #[tool(
        description = "Execute a SQL statement and return its rows as strings.\nRows are capped at limit (default 100); truncated is true when more rows existed.\nOutput format: json (default), table, or markdown."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<Json<ExecuteQueryOutput>, McpError> {
        QueryToolHandler::new(self.connection_manager.clone())
            .execute_query(input)
            .await
            .map(Json)
            .map_err(tool_error("execute_query"))
    }
}

#[tool_handler]
impl ServerHandler for TableService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "duckdb-mcp-server".to_owned(),
                title: Some("DuckDB MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for loading data files into an embedded DuckDB database and querying them with SQL.\n\
                \n\
                ## Workflow\n\
                1. Call `create_table_from_file` to load a CSV, Parquet or JSON file as a table\n\
                2. Call `list_tables` to see what is loaded and how many rows each table holds\n\
                3. Call `describe_table` to inspect column names, types and sample rows\n\
                4. Call `execute_query` to run SQL (DuckDB dialect)\n\
                \n\
                ## Notes\n\
                - Relative file paths resolve against the server's working directory.\n\
                - `execute_query` returns at most `limit` rows (default 100); check `truncated`.\n\
                - Every cell is returned as a string; NULL cells read \"NULL\".\n\
                - Table names are case-sensitive in `describe_table`."
                    .to_string(),
            ),
        }
    }
}
