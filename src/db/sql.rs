//! SQL text helpers for the statements the server composes itself.
//!
//! Identifiers and file paths cannot be bound as parameters inside DDL or table
//! function calls, so they are quoted here instead.

/// Quote an identifier with double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, doubling any embedded quote.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `SELECT COUNT(*)` over a quoted table name.
pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_identifier(table))
}

/// Fetch at most `limit` rows of a table.
pub fn sample_rows(table: &str, limit: usize) -> String {
    format!("SELECT * FROM {} LIMIT {}", quote_identifier(table), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("trips"), "\"trips\"");
        assert_eq!(quote_identifier("my table"), "\"my table\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            quote_identifier("x\"; DROP TABLE y; --"),
            "\"x\"\"; DROP TABLE y; --\""
        );
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("/tmp/a.csv"), "'/tmp/a.csv'");
        assert_eq!(quote_literal("/tmp/o'brien.csv"), "'/tmp/o''brien.csv'");
    }

    #[test]
    fn test_count_and_sample() {
        assert_eq!(count_rows("Trips"), "SELECT COUNT(*) FROM \"Trips\"");
        assert_eq!(sample_rows("t", 5), "SELECT * FROM \"t\" LIMIT 5");
    }
}
