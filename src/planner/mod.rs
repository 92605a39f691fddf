//! View planner - compiles a [`View`](crate::model::View) into a query plan.
//!
//! Three steps:
//! 1. Scope: result-set, year, area and detail-filter predicates ANDed
//! 2. Buckets: ordered group rules folded into CASE label and rank expressions
//! 3. Plan: paged row selection, or grouped aggregation when groups exist

pub mod bucket;
pub mod builder;
pub mod plan;
pub mod predicate;

pub use bucket::{build_buckets, BucketExpression};
pub use builder::{rescale_percent, PlanBuilder, Scope};
pub use plan::{id_order, Bucketing, Pagination, PlanMode, QueryPlan, Selection, Shape};
pub use predicate::{compile, Bound, CompareOp, DegradeReason, Predicate};
