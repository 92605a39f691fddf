//! Parses generated SQL with sqlparser so tests catch malformed output.

use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Accepts both inline and bound renderings; `?` and `$n` both parse.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parsed = match dialect {
        Dialect::Sqlite => Parser::parse_sql(&SQLiteDialect {}, sql),
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::DuckDb => Parser::parse_sql(&DuckDbDialect {}, sql),
    };
    parsed
        .map(|_| ())
        .map_err(|e| format!("{} rejected generated SQL: {}\n{}", dialect, e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_parse() {
        validate_sql("SELECT * FROM t WHERE a = ?", Dialect::Sqlite).unwrap();
        validate_sql("SELECT * FROM t WHERE a = $1", Dialect::Postgres).unwrap();
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(validate_sql("SELEC * FORM t", Dialect::DuckDb).is_err());
    }
}
