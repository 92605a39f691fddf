//! Query engine: plans views, runs them against a store and shapes the result.

pub mod format;
mod payload;

pub use payload::{ChartPayload, Point, TablePayload, ViewPayload};

use crate::cursor::{BatchCursor, BatchRequest};
use crate::error::{EngineResult, ValidationError};
use crate::model::column::{Unit, AREA_GROUP_COLUMN, REFERENCE_DATE_COLUMN};
use crate::model::view::View;
use crate::planner::{Pagination, PlanBuilder, PlanMode, QueryPlan, Scope, Shape};
use crate::sql::{Dialect, SortDir};
use crate::store::{Row, TabularStore};
use crate::value::Value;

/// Runs views against a [`TabularStore`].
///
/// Holds no state besides the store; `&S` works wherever `S` does.
pub struct QueryEngine<S> {
    store: S,
}

impl<S: TabularStore> QueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compile `view` without running it.
    pub fn plan(&self, view: &View, page: Pagination) -> EngineResult<QueryPlan> {
        Ok(PlanBuilder::new(view).build(page)?)
    }

    /// Run `view`. `page` applies to unbucketed charts and tables only.
    pub fn execute(&self, view: &View, page: Pagination) -> EngineResult<ViewPayload> {
        let plan = self.plan(view, page)?;
        let unit = plan.unit;

        let payload = match plan.shape {
            Shape::Chart { x, y, aggregation } => {
                let (data, pagination_applied) = match &plan.mode {
                    PlanMode::Rows(selection) => {
                        let rows = self.store.select(unit, selection)?;
                        (rows.into_iter().map(point_from_row).collect(), true)
                    }
                    PlanMode::Buckets(bucketing) => {
                        let buckets = self.store.aggregate_buckets(unit, bucketing)?;
                        let points = buckets.into_iter().map(|(x, y)| Point { x, y }).collect();
                        (points, false)
                    }
                };
                ViewPayload::Chart(ChartPayload {
                    data,
                    x_axis_column: x,
                    y_axis_column: y,
                    aggregation,
                    pagination_applied,
                })
            }
            Shape::Table { columns } => {
                let data = match &plan.mode {
                    PlanMode::Rows(selection) => self.store.select(unit, selection)?,
                    PlanMode::Buckets(bucketing) => self
                        .store
                        .aggregate_buckets(unit, bucketing)?
                        .into_iter()
                        .map(|(x, y)| Row::new().with("x", x).with("y", y))
                        .collect(),
                };
                ViewPayload::Table(TablePayload { columns, data })
            }
        };
        Ok(payload)
    }

    /// SQL for `view` with inline literals. Execution never uses this text.
    pub fn explain(&self, view: &View, page: Pagination, dialect: Dialect) -> EngineResult<String> {
        Ok(self.plan(view, page)?.to_query().to_sql(dialect))
    }

    /// Distinct reference dates of a result set, newest first.
    pub fn reference_dates(&self, dataset_result_id: i64, unit: Unit) -> EngineResult<Vec<String>> {
        let values = self.distinct(dataset_result_id, unit, REFERENCE_DATE_COLUMN, SortDir::Desc)?;
        Ok(values.iter().filter_map(Value::to_text).collect())
    }

    /// Distinct non-empty area names of a result set, ascending.
    pub fn area_groups(&self, dataset_result_id: i64, unit: Unit) -> EngineResult<Vec<String>> {
        let values = self.distinct(dataset_result_id, unit, AREA_GROUP_COLUMN, SortDir::Asc)?;
        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Value::Text(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect())
    }

    fn distinct(
        &self,
        dataset_result_id: i64,
        unit: Unit,
        column: &str,
        direction: SortDir,
    ) -> EngineResult<Vec<Value>> {
        if dataset_result_id <= 0 {
            return Err(ValidationError::MissingDatasetResultId.into());
        }
        let predicate = Scope::new(unit, dataset_result_id).into_predicate();
        Ok(self
            .store
            .select_distinct_ordered(unit, column, predicate.as_ref(), direction)?)
    }

    /// One batch of rows after `request.cursor`.
    pub fn next_batch(&self, request: &BatchRequest) -> EngineResult<Vec<Row>> {
        let selection = request.selection()?;
        Ok(self.store.select(request.unit, &selection)?)
    }

    /// Iterate batches until the stream is exhausted.
    pub fn stream(&self, request: BatchRequest) -> BatchCursor<'_, S> {
        BatchCursor::new(self, request)
    }
}

fn point_from_row(row: Row) -> Point {
    let mut values = row.0.into_iter().map(|(_, v)| v);
    let x = values.next().unwrap_or(Value::Null);
    let y = values.next().unwrap_or(Value::Null);
    Point { x, y }
}
