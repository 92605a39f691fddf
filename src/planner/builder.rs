//! Build query plans from views.

use crate::error::ValidationError;
use crate::model::column::{
    ColumnMeta, Unit, AREA_GROUP_COLUMN, ID_COLUMN, REFERENCE_DATE_COLUMN, RESULT_ID_COLUMN,
};
use crate::model::condition::Condition;
use crate::model::parameter::{AxisSlot, YearRange, COLUMNS_KEY};
use crate::model::view::{Layout, Style, View};
use crate::sql::{col, lit_int, lit_str, Expr, ExprExt, OrderByExpr};

use super::bucket::build_buckets;
use super::plan::{id_order, Bucketing, Pagination, PlanMode, QueryPlan, Selection, Shape};
use super::predicate::{compile, DegradeReason};

/// Conjunction of the predicates scoping a query to one estimation run.
#[derive(Debug, Clone)]
pub struct Scope {
    unit: Unit,
    terms: Vec<Expr>,
}

impl Scope {
    pub fn new(unit: Unit, dataset_result_id: i64) -> Self {
        Self {
            unit,
            terms: vec![col(RESULT_ID_COLUMN).eq(lit_int(dataset_result_id))],
        }
    }

    /// Reference-date bounds; each side applies on its own.
    pub fn year(mut self, range: Option<&YearRange>) -> Self {
        if let Some(range) = range {
            if let Some(start) = range.start_date() {
                self.terms.push(col(REFERENCE_DATE_COLUMN).gte(lit_str(&start)));
            }
            if let Some(end) = range.end_date() {
                self.terms.push(col(REFERENCE_DATE_COLUMN).lte(lit_str(&end)));
            }
        }
        self
    }

    pub fn reference_date(mut self, date: Option<&str>) -> Self {
        if let Some(date) = date {
            self.terms.push(col(REFERENCE_DATE_COLUMN).eq(lit_str(date)));
        }
        self
    }

    /// Rows after the `id` watermark.
    pub fn after(mut self, cursor: Option<i64>) -> Self {
        if let Some(cursor) = cursor {
            self.terms.push(col(ID_COLUMN).gt(lit_int(cursor)));
        }
        self
    }

    /// Area membership; no restriction when `names` is empty.
    pub fn areas(mut self, names: &[String]) -> Self {
        if !names.is_empty() {
            let values = names.iter().map(|n| lit_str(n)).collect();
            self.terms.push(col(AREA_GROUP_COLUMN).in_list(values));
        }
        self
    }

    /// Detail filters. Conditions on columns outside the catalog degrade.
    pub fn filters<'c>(mut self, conditions: impl IntoIterator<Item = &'c Condition>) -> Self {
        for condition in conditions {
            if let Some(expr) = filter_expr(self.unit, condition) {
                self.terms.push(expr);
            }
        }
        self
    }

    pub fn into_predicate(self) -> Option<Expr> {
        Expr::conjunction(self.terms)
    }
}

fn filter_expr(unit: Unit, condition: &Condition) -> Option<Expr> {
    let reason = match condition.reference_column.as_deref() {
        None => DegradeReason::MissingColumn,
        Some(column) if unit.has_column(column) => {
            let condition = rescale_percent(condition, unit.column(column));
            return compile(column, &condition).to_expr();
        }
        Some(column) => DegradeReason::UnknownColumn(column.into()),
    };
    tracing::warn!(%unit, %reason, "filter condition degraded to no-op");
    None
}

/// Percent columns hold 0–1 fractions while conditions are written in percent.
pub fn rescale_percent(condition: &Condition, meta: Option<&ColumnMeta>) -> Condition {
    let percent = meta.is_some_and(ColumnMeta::is_percent);
    if percent && condition.reference_column_type.is_float() {
        condition.clone().map_numbers(|n| n / 100.0)
    } else {
        condition.clone()
    }
}

/// Compiles one [`View`] into a [`QueryPlan`].
pub struct PlanBuilder<'a> {
    view: &'a View,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(view: &'a View) -> Self {
        Self { view }
    }

    pub fn build(&self, page: Pagination) -> Result<QueryPlan, ValidationError> {
        let view = self.view;
        if view.dataset_result_id <= 0 {
            return Err(ValidationError::MissingDatasetResultId);
        }

        let layout = view.layout()?;
        if !layout.accepts_groups() && view.groups().next().is_some() {
            tracing::warn!(style = %view.style, "ignoring group parameters");
        }

        let predicate = Scope::new(view.unit, view.dataset_result_id)
            .year(view.year())
            .areas(view.areas())
            .filters(view.filters())
            .into_predicate();

        let (shape, mode) = match layout {
            Layout::Map => {
                return Err(ValidationError::UnsupportedView {
                    style: view.style,
                    unit: view.unit,
                })
            }
            Layout::Table => {
                let columns = self.table_columns()?;
                let selection = Selection {
                    columns: columns.iter().map(|c| c.name.to_string()).collect(),
                    predicate,
                    order_by: vec![id_order()],
                    page,
                };
                (Shape::Table { columns }, PlanMode::Rows(selection))
            }
            Layout::Chart { x, y } => {
                let x = self.axis(x)?;
                let y = self.axis(y)?;
                let aggregation = view.aggregation();
                let mode = if view.groups().next().is_some() {
                    let buckets = build_buckets(
                        x.name,
                        view.groups()
                            .map(|(label, c)| (label, rescale_percent(c, Some(x)))),
                    );
                    PlanMode::Buckets(Bucketing {
                        predicate,
                        bucket: buckets.label,
                        rank: buckets.rank,
                        aggregation,
                        value_column: y.name.into(),
                    })
                } else {
                    PlanMode::Rows(Selection {
                        columns: vec![x.name.into(), y.name.into()],
                        predicate,
                        order_by: self.chart_order(),
                        page,
                    })
                };
                (Shape::Chart { x, y, aggregation }, mode)
            }
        };

        let plan = QueryPlan {
            unit: view.unit,
            shape,
            mode,
        };
        tracing::debug!(
            style = %view.style,
            unit = %view.unit,
            bucketed = plan.is_bucketed(),
            "planned view"
        );
        Ok(plan)
    }

    fn axis(&self, slot: AxisSlot) -> Result<&'static ColumnMeta, ValidationError> {
        let name = self
            .view
            .column(slot)
            .ok_or(ValidationError::MissingSlot(slot.key()))?;
        self.catalog_column(name)
    }

    fn table_columns(&self) -> Result<Vec<&'static ColumnMeta>, ValidationError> {
        let names = self
            .view
            .table_columns()
            .filter(|names| !names.is_empty())
            .ok_or(ValidationError::MissingSlot(COLUMNS_KEY))?;
        names.iter().map(|n| self.catalog_column(n)).collect()
    }

    fn catalog_column(&self, name: &str) -> Result<&'static ColumnMeta, ValidationError> {
        self.view
            .unit
            .column(name)
            .ok_or_else(|| ValidationError::UnknownColumn {
                column: name.into(),
                unit: self.view.unit,
            })
    }

    fn chart_order(&self) -> Vec<OrderByExpr> {
        match self.view.style {
            Style::Bar => vec![OrderByExpr::asc(col(REFERENCE_DATE_COLUMN)), id_order()],
            _ => vec![id_order()],
        }
    }
}
