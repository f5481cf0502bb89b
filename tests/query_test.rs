//! Query execution and result marshalling.

use duckdb_mcp_server::ErrorCategory;
use duckdb_mcp_server::db::ConnectionManager;
use duckdb_mcp_server::tools::format::OutputFormat;
use duckdb_mcp_server::tools::query::{ExecuteQueryInput, QueryToolHandler};
use rand::Rng;
use std::sync::Arc;

fn setup() -> (Arc<ConnectionManager>, QueryToolHandler) {
    let db = Arc::new(ConnectionManager::open_in_memory().unwrap());
    (db.clone(), QueryToolHandler::new(db))
}

fn query(sql: &str, limit: Option<i64>) -> ExecuteQueryInput {
    ExecuteQueryInput {
        query: sql.to_string(),
        limit,
        format: OutputFormat::Json,
    }
}

#[tokio::test]
async fn test_default_limit_is_one_hundred() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query("SELECT * FROM range(500)", None))
        .await
        .unwrap();
    assert_eq!(out.row_count, 100);
    assert_eq!(out.data.len(), 100);
    assert!(out.truncated);
    assert_eq!(out.message.as_deref(), Some("Results limited to 100 rows"));
}

#[tokio::test]
async fn test_negative_limit_uses_default() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query("SELECT * FROM range(5)", Some(-7)))
        .await
        .unwrap();
    assert_eq!(out.row_count, 5);
    assert!(!out.truncated);
}

#[tokio::test]
async fn test_randomized_truncation() {
    let (_, handler) = setup();
    let mut rng = rand::thread_rng();

    for _ in 0..25 {
        let total: i64 = rng.gen_range(0..60);
        let limit: i64 = rng.gen_range(1..40);

        let out = handler
            .execute_query(query(&format!("SELECT * FROM range({total})"), Some(limit)))
            .await
            .unwrap();

        let expected = total.min(limit) as usize;
        assert_eq!(out.row_count, expected, "total={total} limit={limit}");
        assert_eq!(out.data.len(), out.row_count);
        assert_eq!(out.truncated, total > limit, "total={total} limit={limit}");
    }
}

#[tokio::test]
async fn test_nulls_render_as_null_text() {
    let (db, handler) = setup();
    db.exec(
        "CREATE TABLE people AS SELECT * FROM (VALUES (1, 'ann', NULL), (2, NULL, 3.5)) t(id, name, score)",
        &[],
    )
    .unwrap();

    let out = handler
        .execute_query(query("SELECT id, name, score FROM people ORDER BY id", None))
        .await
        .unwrap();
    assert_eq!(out.columns, vec!["id", "name", "score"]);
    assert_eq!(out.data[0], vec!["1", "ann", "NULL"]);
    assert_eq!(out.data[1], vec!["2", "NULL", "3.5"]);
}

#[tokio::test]
async fn test_column_names_preserved_verbatim() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query(
            "SELECT 1 AS \"Mixed Case\", 2 AS lower, 3 AS \"with space\"",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(out.columns, vec!["Mixed Case", "lower", "with space"]);
}

#[tokio::test]
async fn test_typed_values_render_as_text() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query(
            "SELECT true AS b, 12345678901234::BIGINT AS big, 1.25::DECIMAL(5,2) AS d, \
             DATE '2024-03-01' AS day, TIMESTAMP '2024-03-01 12:30:00' AS ts",
            None,
        ))
        .await
        .unwrap();
    let row = &out.data[0];
    assert_eq!(row[0], "true");
    assert_eq!(row[1], "12345678901234");
    assert_eq!(row[2], "1.25");
    assert_eq!(row[3], "2024-03-01");
    assert!(row[4].starts_with("2024-03-01"));
    assert!(row[4].contains("12:30:00"));

    let out = handler
        .execute_query(query("SELECT 1.1::REAL AS r, 0.1::REAL AS s, 2.5::DOUBLE AS d", None))
        .await
        .unwrap();
    assert_eq!(out.data[0], vec!["1.1", "0.1", "2.5"]);
}

#[tokio::test]
async fn test_nested_values_render_as_text() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query(
            "SELECT [1, 2, 3] AS l, {'a': 1, 'b': 'x'} AS s, [NULL, 4] AS n",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(out.data[0], vec!["[1, 2, 3]", "{a: 1, b: x}", "[NULL, 4]"]);
}

#[tokio::test]
async fn test_infinite_temporals_render_as_infinity() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(query(
            "SELECT 'infinity'::DATE AS d, '-infinity'::DATE AS nd, \
             'infinity'::TIMESTAMP AS t, '-infinity'::TIMESTAMP AS nt",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        out.data[0],
        vec!["infinity", "-infinity", "infinity", "-infinity"]
    );
}

#[tokio::test]
async fn test_statements_without_rows() {
    let (_, handler) = setup();
    handler
        .execute_query(query("CREATE TABLE scratch (x INTEGER)", None))
        .await
        .unwrap();
    let out = handler
        .execute_query(query("SELECT * FROM scratch", None))
        .await
        .unwrap();
    assert_eq!(out.columns, vec!["x"]);
    assert_eq!(out.row_count, 0);
    assert!(!out.truncated);
}

#[tokio::test]
async fn test_syntax_error_is_execution_error() {
    let (_, handler) = setup();
    let err = handler
        .execute_query(query("SELEKT 1", None))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Execution);
}

#[tokio::test]
async fn test_table_format() {
    let (_, handler) = setup();
    let out = handler
        .execute_query(ExecuteQueryInput {
            query: "SELECT 7 AS n, 'x' AS s".to_string(),
            limit: None,
            format: OutputFormat::Table,
        })
        .await
        .unwrap();
    let formatted = out.formatted.unwrap();
    assert!(formatted.contains("| n | s |"));
    assert!(formatted.contains("| 7 | x |"));
    assert_eq!(out.data, vec![vec!["7", "x"]]);
}
