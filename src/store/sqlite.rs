//! Embedded SQLite store.

use std::path::Path;

use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};

use super::{Row, StoreError, StoreResult, TabularStore, ViewRepository};
use crate::model::column::{
    Unit, AREA_GROUP_COLUMN, ID_COLUMN, REFERENCE_DATE_COLUMN, RESULT_ID_COLUMN,
};
use crate::planner::{Bucketing, Selection};
use crate::sql::{col, BoundSql, Dialect, Expr, Literal, OrderByExpr, Query, SortDir, SqlDialect};
use crate::value::Value;

/// Detail tables and saved views in one SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    /// Create missing tables and indexes.
    fn init(&self) -> StoreResult<()> {
        let mut ddl = String::new();
        for unit in [Unit::Building, Unit::Area] {
            ddl.push_str(&detail_table_ddl(unit));
        }
        ddl.push_str(
            "
            CREATE TABLE IF NOT EXISTS result_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                data_set_result_id INTEGER NOT NULL,
                style TEXT NOT NULL,
                unit TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                parameters TEXT NOT NULL DEFAULT '[]'
            );
            ",
        );
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    pub(super) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Saved views in this database.
    pub fn views(&self) -> ViewRepository<'_> {
        ViewRepository::new(self)
    }

    /// Insert one detail row and return its id.
    ///
    /// Column names are checked against the unit's table before they reach
    /// the statement text.
    pub fn insert(&self, unit: Unit, row: &Row) -> StoreResult<i64> {
        let dialect = Dialect::Sqlite;
        let mut columns = Vec::with_capacity(row.len());
        for column in row.columns() {
            if !unit.has_column(column) {
                return Err(StoreError::UnknownColumn {
                    column: column.into(),
                    unit,
                });
            }
            columns.push(dialect.quote_identifier(column));
        }
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| dialect.placeholder(i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote_identifier(unit.table_name()),
            columns.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(row.values()))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn query_rows(&self, bound: &BoundSql) -> StoreResult<Vec<Row>> {
        tracing::debug!(sql = %bound.sql, params = bound.params.len(), "executing query");

        let mut stmt = self.conn.prepare(&bound.sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(bound.params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                cells.push((name.clone(), row.get::<_, Value>(i)?));
            }
            out.push(Row(cells));
        }
        Ok(out)
    }
}

fn detail_table_ddl(unit: Unit) -> String {
    let dialect = Dialect::Sqlite;
    let table = dialect.quote_identifier(unit.table_name());
    let mut columns = vec![
        format!("{ID_COLUMN} INTEGER PRIMARY KEY"),
        format!("{RESULT_ID_COLUMN} INTEGER NOT NULL"),
        format!("{REFERENCE_DATE_COLUMN} TEXT"),
        format!("{AREA_GROUP_COLUMN} TEXT"),
    ];
    columns.extend(
        unit.columns()
            .iter()
            .filter(|c| c.name != REFERENCE_DATE_COLUMN && c.name != AREA_GROUP_COLUMN)
            .map(|c| format!("{} {}", dialect.quote_identifier(c.name), c.column_type.sql_type())),
    );
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    {}\n);\n\
         CREATE INDEX IF NOT EXISTS {} ON {table} ({RESULT_ID_COLUMN}, {ID_COLUMN});\n",
        columns.join(",\n    "),
        dialect.quote_identifier(&format!("{}_result_idx", unit.table_name())),
    )
}

impl TabularStore for SqliteStore {
    fn select(&self, unit: Unit, selection: &Selection) -> StoreResult<Vec<Row>> {
        let bound = selection.to_query(unit).to_bound_sql(Dialect::Sqlite);
        self.query_rows(&bound)
    }

    fn select_distinct_ordered(
        &self,
        unit: Unit,
        column: &str,
        predicate: Option<&Expr>,
        direction: SortDir,
    ) -> StoreResult<Vec<Value>> {
        let query = Query::new()
            .select(vec![col(column)])
            .distinct()
            .from(unit.table_name())
            .filter_opt(predicate.cloned())
            .order_by(vec![OrderByExpr::new(col(column), direction)]);
        let rows = self.query_rows(&query.to_bound_sql(Dialect::Sqlite))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.0.into_iter().next().map(|(_, v)| v))
            .collect())
    }

    fn aggregate_buckets(
        &self,
        unit: Unit,
        bucketing: &Bucketing,
    ) -> StoreResult<Vec<(Value, Value)>> {
        let bound = bucketing.to_query(unit).to_bound_sql(Dialect::Sqlite);
        let rows = self.query_rows(&bound)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut values = row.0.into_iter().map(|(_, v)| v);
                let x = values.next().unwrap_or(Value::Null);
                let y = values.next().unwrap_or(Value::Null);
                (x, y)
            })
            .collect())
    }
}

impl ToSql for Literal {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Literal::Int(n) => ToSqlOutput::from(*n),
            Literal::Float(f) => ToSqlOutput::from(*f),
            Literal::String(s) => ToSqlOutput::from(s.as_str()),
            Literal::Bool(b) => ToSqlOutput::from(*b),
            Literal::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::from(rusqlite::types::Null),
            Value::Integer(n) => ToSqlOutput::from(*n),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        })
    }
}
