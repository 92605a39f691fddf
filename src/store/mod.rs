//! Tabular storage.
//!
//! The engine reads detail rows through [`TabularStore`]. Predicates, bucket
//! expressions and orderings travel as the typed SQL AST; an implementation
//! renders them for its backend. [`SqliteStore`] renders with bound
//! parameters, so condition values never become SQL text.

mod row;
mod sqlite;
mod views;

pub use row::Row;
pub use sqlite::SqliteStore;
pub use views::ViewRepository;

use crate::model::column::Unit;
use crate::planner::{Bucketing, Selection};
use crate::sql::{Expr, SortDir};
use crate::value::Value;

/// Errors raised by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A batch row without an integer `id` cannot advance a cursor.
    #[error("batch row has no integer id column")]
    MissingCursorColumn,

    /// An insert named a column the unit does not have.
    #[error("column '{column}' does not exist for unit '{unit}'")]
    UnknownColumn { column: String, unit: Unit },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row-oriented storage with predicate pushdown and grouped aggregation.
pub trait TabularStore {
    /// Rows of `unit`'s table matching `selection`.
    fn select(&self, unit: Unit, selection: &Selection) -> StoreResult<Vec<Row>>;

    /// Distinct values of `column` among rows matching `predicate`.
    fn select_distinct_ordered(
        &self,
        unit: Unit,
        column: &str,
        predicate: Option<&Expr>,
        direction: SortDir,
    ) -> StoreResult<Vec<Value>>;

    /// `(label, aggregate)` per matched bucket, ordered by first matching rule.
    fn aggregate_buckets(&self, unit: Unit, bucketing: &Bucketing)
        -> StoreResult<Vec<(Value, Value)>>;
}

impl<S: TabularStore + ?Sized> TabularStore for &S {
    fn select(&self, unit: Unit, selection: &Selection) -> StoreResult<Vec<Row>> {
        (**self).select(unit, selection)
    }

    fn select_distinct_ordered(
        &self,
        unit: Unit,
        column: &str,
        predicate: Option<&Expr>,
        direction: SortDir,
    ) -> StoreResult<Vec<Value>> {
        (**self).select_distinct_ordered(unit, column, predicate, direction)
    }

    fn aggregate_buckets(
        &self,
        unit: Unit,
        bucketing: &Bucketing,
    ) -> StoreResult<Vec<(Value, Value)>> {
        (**self).aggregate_buckets(unit, bucketing)
    }
}
