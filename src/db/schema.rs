//! Schema introspection.
//!
//! Catalog queries live in the `queries` submodule. Only the `main` schema of
//! the connection's own catalog is visited; attached databases and temporary
//! schemas are not listed.

use crate::db::connection::ConnectionManager;
use crate::db::marshal::marshal;
use crate::db::sql;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnInfo, SAMPLE_ROW_LIMIT, TableDescription, TableInfo, TableKind};
use duckdb::types::Value;
use tracing::{debug, warn};

mod queries {
    pub const LIST_TABLES: &str = r#"
        SELECT table_name, table_type
        FROM information_schema.tables
        WHERE table_catalog = current_database() AND table_schema = 'main'
        ORDER BY table_name
    "#;

    pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT column_name, data_type, is_nullable
        FROM information_schema.columns
        WHERE table_name = ?
          AND table_catalog = current_database()
          AND table_schema = 'main'
        ORDER BY ordinal_position
    "#;
}

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List tables and views in name order.
    ///
    /// Row counts are best-effort: a table whose count fails is reported with
    /// zero rows instead of failing the whole listing. Views are never counted.
    pub fn list_tables(db: &ConnectionManager) -> DbResult<Vec<TableInfo>> {
        let entries = db.query(queries::LIST_TABLES, &[], |cursor| {
            let mut entries = Vec::new();
            while let Some(row) = cursor.next_row()? {
                let mut cells = row.into_iter();
                let name = cells.next().map(|c| c.to_string()).unwrap_or_default();
                let kind = cells
                    .next()
                    .map(|c| TableKind::parse(&c.to_string()))
                    .unwrap_or(TableKind::Table);
                entries.push(TableInfo::new(name, kind));
            }
            Ok(entries)
        })?;

        let tables = with_row_counts(entries, |name| {
            db.query_count(&sql::count_rows(name), &[])
        })?;

        debug!(count = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Describe a table's columns and fetch up to five sample rows.
    ///
    /// A name with no columns in the catalog is reported as not found, which
    /// also covers names that exist only in another schema.
    pub fn describe_table(db: &ConnectionManager, table_name: &str) -> DbResult<TableDescription> {
        let params = [Value::Text(table_name.to_string())];
        let columns = db.query(queries::DESCRIBE_COLUMNS, &params, |cursor| {
            let mut columns = Vec::new();
            while let Some(row) = cursor.next_row()? {
                let mut cells = row.into_iter().map(|c| c.to_string());
                let name = cells.next().unwrap_or_default();
                let data_type = cells.next().unwrap_or_default();
                let nullable = cells.next().is_some_and(|n| n == "YES");
                columns.push(ColumnInfo::new(name, data_type, nullable));
            }
            Ok(columns)
        })?;

        if columns.is_empty() {
            return Err(DbError::table_not_found(table_name));
        }

        let sample = db.query(
            &sql::sample_rows(table_name, SAMPLE_ROW_LIMIT),
            &[],
            |cursor| marshal(cursor, SAMPLE_ROW_LIMIT),
        )?;

        debug!(
            table = %table_name,
            columns = columns.len(),
            sample_rows = sample.row_count(),
            "Described table"
        );

        Ok(TableDescription {
            table_name: table_name.to_string(),
            columns,
            sample_rows: sample.text_rows(),
        })
    }
}

/// Fill in row counts for tables, leaving views at zero.
///
/// A failed count is downgraded to zero; only a closed connection aborts.
fn with_row_counts(
    entries: Vec<TableInfo>,
    mut count: impl FnMut(&str) -> DbResult<u64>,
) -> DbResult<Vec<TableInfo>> {
    let mut tables = Vec::with_capacity(entries.len());
    for info in entries {
        if info.kind == TableKind::View {
            tables.push(info);
            continue;
        }
        match count(&info.name) {
            Ok(rows) => tables.push(info.with_row_count(rows)),
            Err(DbError::ConnectionClosed) => return Err(DbError::ConnectionClosed),
            Err(e) => {
                warn!(table = %info.name, error = %e, "Row count failed; reporting 0");
                tables.push(info);
            }
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn db() -> ConnectionManager {
        ConnectionManager::open_in_memory().unwrap()
    }

    #[test]
    fn test_list_tables_empty() {
        assert!(SchemaInspector::list_tables(&db()).unwrap().is_empty());
    }

    #[test]
    fn test_list_tables_sorted_with_counts() {
        let db = db();
        db.exec("CREATE TABLE zebra AS SELECT * FROM range(3)", &[]).unwrap();
        db.exec("CREATE TABLE alpha AS SELECT * FROM range(12)", &[]).unwrap();
        db.exec("CREATE VIEW middle AS SELECT * FROM alpha", &[]).unwrap();

        let tables = SchemaInspector::list_tables(&db).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "middle", "zebra"]);
        assert_eq!(tables[0].row_count, 12);
        assert_eq!(tables[1].kind, TableKind::View);
        assert_eq!(tables[1].row_count, 0);
        assert_eq!(tables[2].row_count, 3);
    }

    #[test]
    fn test_list_tables_quotes_names() {
        let db = db();
        db.exec("CREATE TABLE \"Mixed Case\" (x INTEGER)", &[]).unwrap();
        db.exec("INSERT INTO \"Mixed Case\" VALUES (1), (2)", &[]).unwrap();

        let tables = SchemaInspector::list_tables(&db).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Mixed Case");
        assert_eq!(tables[0].row_count, 2);
    }

    #[test]
    fn test_failed_count_reports_zero() {
        let entries = vec![
            TableInfo::new("good", TableKind::Table),
            TableInfo::new("broken", TableKind::Table),
            TableInfo::new("view", TableKind::View),
        ];
        let mut counted = Vec::new();
        let tables = with_row_counts(entries, |name| {
            counted.push(name.to_string());
            match name {
                "good" => Ok(7),
                _ => Err(DbError::execution("Catalog Error: Table does not exist")),
            }
        })
        .unwrap();

        assert_eq!(counted, vec!["good", "broken"]);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].row_count, 7);
        assert_eq!(tables[1].name, "broken");
        assert_eq!(tables[1].row_count, 0);
        assert_eq!(tables[2].row_count, 0);
    }

    #[test]
    fn test_closed_connection_during_count_is_an_error() {
        let entries = vec![TableInfo::new("t", TableKind::Table)];
        let err = with_row_counts(entries, |_| Err(DbError::ConnectionClosed)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn test_attached_catalogs_are_not_listed() {
        let db = db();
        db.exec("CREATE TABLE local AS SELECT * FROM range(4)", &[]).unwrap();
        db.exec("ATTACH ':memory:' AS other", &[]).unwrap();
        db.exec("CREATE TABLE other.main.ghost AS SELECT 1 AS x", &[])
            .unwrap();

        let tables = SchemaInspector::list_tables(&db).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["local"]);
        assert_eq!(tables[0].row_count, 4);

        let err = SchemaInspector::describe_table(&db, "ghost").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_describe_table_columns_in_order() {
        let db = db();
        db.exec(
            "CREATE TABLE people (id INTEGER NOT NULL, name VARCHAR, score DOUBLE)",
            &[],
        )
        .unwrap();

        let desc = SchemaInspector::describe_table(&db, "people").unwrap();
        assert_eq!(desc.table_name, "people");
        let names: Vec<_> = desc.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "score"]);
        assert_eq!(desc.columns[0].data_type, "INTEGER");
        assert!(!desc.columns[0].nullable);
        assert!(desc.columns[1].nullable);
        assert!(desc.sample_rows.is_empty());
    }

    #[test]
    fn test_describe_table_samples_at_most_five_rows() {
        let db = db();
        db.exec("CREATE TABLE big AS SELECT range AS n FROM range(50)", &[])
            .unwrap();
        let desc = SchemaInspector::describe_table(&db, "big").unwrap();
        assert_eq!(desc.sample_rows.len(), 5);
    }

    #[test]
    fn test_describe_table_renders_nulls() {
        let db = db();
        db.exec("CREATE TABLE n AS SELECT NULL::INTEGER AS x", &[]).unwrap();
        let desc = SchemaInspector::describe_table(&db, "n").unwrap();
        assert_eq!(desc.sample_rows, vec![vec!["NULL".to_string()]]);
    }

    #[test]
    fn test_describe_missing_table_is_not_found() {
        let err = SchemaInspector::describe_table(&db(), "nope").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_describe_table_name_is_bound_not_interpolated() {
        let db = db();
        db.exec("CREATE TABLE safe (x INTEGER)", &[]).unwrap();
        let err = SchemaInspector::describe_table(&db, "safe' OR '1'='1").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
