//! Query plan node types.

use serde::{Deserialize, Serialize};

use crate::model::column::{ColumnMeta, Unit, ID_COLUMN};
use crate::model::parameter::Aggregation;
use crate::sql::{
    avg, col, count_star, lit_str, min, star, sum, Cte, Expr, ExprExt, OrderByExpr, Query,
    SelectExpr,
};

/// CTE holding the bucketed base rows.
pub const BUCKETED_CTE: &str = "bucketed";

/// Page of an unbucketed result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Every row.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Row selection pushed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Empty selects every column.
    pub columns: Vec<String>,
    pub predicate: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub page: Pagination,
}

impl Selection {
    pub fn to_query(&self, unit: Unit) -> Query {
        let select: Vec<SelectExpr> = if self.columns.is_empty() {
            vec![star().into()]
        } else {
            self.columns.iter().map(|c| col(c).into()).collect()
        };
        let mut query = Query::new()
            .select(select)
            .from(unit.table_name())
            .filter_opt(self.predicate.clone())
            .order_by(self.order_by.clone());
        if let Some(limit) = self.page.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.page.offset {
            query = query.offset(offset);
        }
        query
    }
}

/// Grouped aggregation over a bucket expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucketing {
    pub predicate: Option<Expr>,
    /// Label expression; NULL for unmatched rows.
    pub bucket: Expr,
    /// Rank of the arm that produced the label.
    pub rank: Expr,
    pub aggregation: Aggregation,
    /// Column aggregated per bucket.
    pub value_column: String,
}

impl Bucketing {
    /// `WITH bucketed AS (...) SELECT bucket AS x, AGG(y) AS y ...`
    ///
    /// Unmatched rows carry a NULL bucket and fail `bucket <> ''` together
    /// with rows labelled with the empty string.
    pub fn to_query(&self, unit: Unit) -> Query {
        let inner = Query::new()
            .select(vec![
                col(&self.value_column).alias("y"),
                self.bucket.clone().alias("bucket"),
                self.rank.clone().alias("bucket_rank"),
            ])
            .from(unit.table_name())
            .filter_opt(self.predicate.clone());

        let value = match self.aggregation {
            Aggregation::Avg => avg(col("y")),
            Aggregation::Sum => sum(col("y")),
            Aggregation::Count => count_star(),
        };

        Query::new()
            .with_cte(Cte::new(BUCKETED_CTE, inner))
            .select(vec![col("bucket").alias("x"), value.alias("y")])
            .from(BUCKETED_CTE)
            .filter(col("bucket").ne(lit_str("")))
            .group_by(vec![col("bucket")])
            .order_by(vec![OrderByExpr::asc(min(col("bucket_rank")))])
    }
}

/// How the result is shaped for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Chart {
        x: &'static ColumnMeta,
        y: &'static ColumnMeta,
        aggregation: Aggregation,
    },
    Table {
        columns: Vec<&'static ColumnMeta>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanMode {
    /// Paged rows, ordered by a stable key.
    Rows(Selection),
    /// One row per bucket, unpaged.
    Buckets(Bucketing),
}

/// A compiled view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub unit: Unit,
    pub shape: Shape,
    pub mode: PlanMode,
}

impl QueryPlan {
    pub fn to_query(&self) -> Query {
        match &self.mode {
            PlanMode::Rows(selection) => selection.to_query(self.unit),
            PlanMode::Buckets(bucketing) => bucketing.to_query(self.unit),
        }
    }

    pub fn is_bucketed(&self) -> bool {
        matches!(self.mode, PlanMode::Buckets(_))
    }
}

/// Ascending `id` order shared by row pages and batches.
pub fn id_order() -> OrderByExpr {
    OrderByExpr::asc(col(ID_COLUMN))
}
