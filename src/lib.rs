//! # soma-bi
//!
//! Query engine for analytical views over vacant-house estimation results.
//!
//! ## Architecture
//!
//! A view is a chart style, an aggregation unit and an ordered list of
//! parameters. The engine compiles it into one SQL query:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 View (style, unit, parameters)           │
//! │  (axes, table columns, year/area/detail filters,         │
//! │   group rules, aggregation)                              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner::predicate, planner::bucket]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Predicates (compare / like / range / degraded)         │
//! │   + CASE bucket label and rank expressions               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner::builder]
//! ┌─────────────────────────────────────────────────────────┐
//! │   QueryPlan: paged rows | grouped buckets                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [store: bound parameters]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ViewPayload: {x, y} series | table rows                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Map views read detail rows through the batch [`cursor`] instead.

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod model;
pub mod planner;
pub mod sql;
pub mod store;
pub mod value;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cursor::{BatchCursor, BatchRequest};
    pub use crate::engine::{format, ChartPayload, Point, QueryEngine, TablePayload, ViewPayload};
    pub use crate::error::{EngineError, EngineResult, ErrorKind, ValidationError};
    pub use crate::model::{
        Aggregation, AxisSlot, Condition, ConditionType, Operation, Parameter, ParameterKind,
        Style, Unit, View, YearRange,
    };
    pub use crate::planner::Pagination;
    pub use crate::sql::Dialect;
    pub use crate::store::{Row, SqliteStore, TabularStore, ViewRepository};
    pub use crate::value::Value;
}

// Also export at crate root for convenience
pub use engine::QueryEngine;
pub use error::{EngineError, EngineResult};
pub use model::View;
pub use store::SqliteStore;
