//! Shapes returned by [`QueryEngine::execute`](super::QueryEngine::execute).

use serde::Serialize;

use crate::model::column::ColumnMeta;
use crate::model::parameter::Aggregation;
use crate::store::Row;
use crate::value::Value;

/// One chart point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: Value,
    pub y: Value,
}

impl Point {
    pub fn new(x: impl Into<Value>, y: impl Into<Value>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub data: Vec<Point>,
    pub x_axis_column: &'static ColumnMeta,
    pub y_axis_column: &'static ColumnMeta,
    pub aggregation: Aggregation,
    /// False for bucketed charts, which always return every bucket.
    pub pagination_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePayload {
    pub columns: Vec<&'static ColumnMeta>,
    pub data: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewPayload {
    Chart(ChartPayload),
    Table(TablePayload),
}

impl ViewPayload {
    pub fn as_chart(&self) -> Option<&ChartPayload> {
        match self {
            ViewPayload::Chart(chart) => Some(chart),
            ViewPayload::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&TablePayload> {
        match self {
            ViewPayload::Table(table) => Some(table),
            ViewPayload::Chart(_) => None,
        }
    }
}
