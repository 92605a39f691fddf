//! Display formatting for payloads.
//!
//! Percent columns are stored as 0–1 fractions and shown as percentages with
//! one decimal, truncated rather than rounded.

use crate::model::column::{ColumnMeta, ColumnType};
use crate::model::parameter::Aggregation;
use crate::store::Row;
use crate::value::Value;

use super::payload::{ChartPayload, TablePayload, ViewPayload};

/// `0.1239` → `12.3`.
pub fn truncate_percent(fraction: f64) -> f64 {
    (fraction * 1000.0).floor() / 10.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Chart y value as displayed.
///
/// Averages of percent columns become truncated percentages; other numbers
/// keep one decimal. Missing values plot as zero.
pub fn chart_value(y: &Value, column: &ColumnMeta, aggregation: Aggregation) -> Value {
    let percent = column.is_percent() && aggregation == Aggregation::Avg;
    match y {
        Value::Null => Value::Integer(0),
        Value::Text(_) => y.clone(),
        Value::Integer(n) if percent => Value::Real(truncate_percent(*n as f64)),
        Value::Integer(_) => y.clone(),
        Value::Real(f) if percent => Value::Real(truncate_percent(*f)),
        Value::Real(f) => Value::Real(round_to(*f, 1)),
    }
}

/// Table cell text.
pub fn format_cell(value: &Value, column: &ColumnMeta) -> String {
    if value.is_null() {
        return String::new();
    }
    if column.column_type == ColumnType::Boolean {
        let set = value.as_f64().is_some_and(|n| n != 0.0);
        return if set { "○" } else { "×" }.into();
    }
    match value {
        Value::Text(s) => s.clone(),
        Value::Integer(n) if !column.is_percent() => n.to_string(),
        _ => match value.as_f64() {
            Some(n) if column.is_percent() => truncate_percent(n).to_string(),
            Some(n) => round_to(n, 2).to_string(),
            None => String::new(),
        },
    }
}

/// Apply display formatting to a raw payload.
pub fn present(payload: ViewPayload) -> ViewPayload {
    match payload {
        ViewPayload::Chart(chart) => ViewPayload::Chart(present_chart(chart)),
        ViewPayload::Table(table) => ViewPayload::Table(present_table(table)),
    }
}

fn present_chart(mut chart: ChartPayload) -> ChartPayload {
    for point in &mut chart.data {
        point.y = chart_value(&point.y, chart.y_axis_column, chart.aggregation);
    }
    chart
}

fn present_table(mut table: TablePayload) -> TablePayload {
    let columns = &table.columns;
    table.data = table
        .data
        .into_iter()
        .map(|row| {
            Row(row
                .0
                .into_iter()
                .map(|(name, value)| {
                    let text = match columns.iter().find(|c| c.name == name) {
                        Some(meta) => format_cell(&value, meta),
                        None => value.to_text().unwrap_or_default(),
                    };
                    (name, Value::Text(text))
                })
                .collect())
        })
        .collect();
    table
}
