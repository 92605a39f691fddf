//! Per-dialect rendering rules.
//!
//! The store executes SQLite. Postgres and DuckDB renderings exist for
//! `explain`, so a compiled view can be inspected for any backend that does
//! predicate pushdown and GROUP BY aggregation.
//!
//! Differences that matter here:
//!
//! | dialect  | booleans   | placeholder | bare OFFSET          |
//! |----------|------------|-------------|----------------------|
//! | sqlite   | `1` / `0`  | `?`         | needs `LIMIT -1`     |
//! | postgres | true/false | `$n`        | allowed              |
//! | duckdb   | true/false | `?`         | allowed              |

use serde::{Deserialize, Serialize};

use super::token::{Token, TokenStream};

/// Rendering hooks a backend can override.
pub trait SqlDialect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Double-quoted, with embedded quotes doubled. Shared by every backend
    /// supported so far.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "true"
        } else {
            "false"
        }
    }

    /// Placeholder for the 1-based `index`-th parameter.
    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    /// Pagination tail.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        limit_offset(limit, offset)
    }
}

/// `LIMIT n OFFSET m`, either part optional. Both values are integer
/// literals so they bind like any other value.
fn limit_offset(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();
    if let Some(limit) = limit {
        ts.push(Token::Limit).space().push(Token::LitInt(to_i64(limit)));
    }
    if let Some(offset) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset).space().push(Token::LitInt(to_i64(offset)));
    }
    ts
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "1"
        } else {
            "0"
        }
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        if limit.is_some() || offset.is_none() {
            return limit_offset(limit, offset);
        }
        // OFFSET alone is a syntax error; -1 lifts the limit.
        let mut ts = TokenStream::new();
        ts.push(Token::Limit)
            .space()
            .push(Token::Raw("-1".into()))
            .space()
            .append(&limit_offset(None, offset));
        ts
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}

/// Postgres-compatible for everything emitted here, with `?` parameters.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }
}

/// Backend selector used in settings and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    DuckDb,
}

impl Dialect {
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
