//! Database layer over a single embedded DuckDB instance.

pub mod connection;
pub mod cursor;
pub mod ingest;
pub mod marshal;
pub mod schema;
pub mod sql;
pub mod value;

pub use connection::ConnectionManager;
pub use cursor::{DuckDbCursor, RowCursor, VecCursor};
pub use ingest::{IngestionPlan, IngestionPlanner, IngestionSummary};
pub use marshal::marshal;
pub use schema::SchemaInspector;
pub use value::CellValue;
