// src/model/view.rs
//! Views: a chart style, an aggregation unit and an ordered parameter list.

use serde::{Deserialize, Serialize};

use super::column::Unit;
use super::condition::Condition;
use super::parameter::{Aggregation, AxisSlot, Parameter, YearRange};
use crate::error::ValidationError;

/// How a view is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Bar,
    Line,
    Pie,
    Table,
    Map,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Bar => "bar",
            Style::Line => "line",
            Style::Pie => "pie",
            Style::Table => "table",
            Style::Map => "map",
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slots a `(style, unit)` combination reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `{x, y}` series from two axis columns.
    Chart { x: AxisSlot, y: AxisSlot },
    /// Rows of the `columns` parameter.
    Table,
    /// Rendered from batches only.
    Map,
}

impl Layout {
    /// Resolve the layout, rejecting combinations the renderer has no chart for.
    pub fn resolve(style: Style, unit: Unit) -> Result<Self, ValidationError> {
        let axes = Layout::Chart {
            x: AxisSlot::XAxis,
            y: AxisSlot::YAxis,
        };
        match (style, unit) {
            (Style::Bar, Unit::Area) | (Style::Line, Unit::Building) => Ok(axes),
            (Style::Pie, Unit::Building) => Ok(Layout::Chart {
                x: AxisSlot::Label,
                y: AxisSlot::Value,
            }),
            (Style::Table, _) => Ok(Layout::Table),
            (Style::Map, _) => Ok(Layout::Map),
            _ => Err(ValidationError::UnsupportedView { style, unit }),
        }
    }

    /// Whether group rules and the aggregation parameter apply.
    pub fn accepts_groups(&self) -> bool {
        matches!(self, Layout::Chart { .. })
    }

    /// Whether detail filters apply.
    pub fn accepts_filters(&self) -> bool {
        !matches!(self, Layout::Map)
    }
}

/// A view snapshot.
///
/// Edits go through [`View::with_parameter`] and [`View::without_parameter`],
/// which return a new value; the engine only ever reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "dataSetResultId", alias = "datasetResultId")]
    pub dataset_result_id: i64,
    pub style: Style,
    pub unit: Unit,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl View {
    /// An empty view.
    pub fn new(dataset_result_id: i64, style: Style, unit: Unit) -> Self {
        Self {
            id: None,
            dataset_result_id,
            style,
            unit,
            title: String::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the parameter with the same key in place, or append it.
    pub fn with_parameter(&self, parameter: Parameter) -> Self {
        let mut next = self.clone();
        match next
            .parameters
            .iter_mut()
            .find(|p| p.key() == parameter.key())
        {
            Some(slot) => *slot = parameter,
            None => next.parameters.push(parameter),
        }
        next
    }

    /// Drop every parameter with `key`.
    pub fn without_parameter(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.parameters.retain(|p| p.key() != key);
        next
    }

    pub fn layout(&self) -> Result<Layout, ValidationError> {
        Layout::resolve(self.style, self.unit)
    }

    /// Column bound to `slot`. The first occurrence wins.
    pub fn column(&self, slot: AxisSlot) -> Option<&str> {
        self.parameters.iter().find_map(|p| match p {
            Parameter::Column { slot: s, column } if *s == slot => Some(column.as_str()),
            _ => None,
        })
    }

    pub fn table_columns(&self) -> Option<&[String]> {
        self.parameters.iter().find_map(|p| match p {
            Parameter::TableColumns(columns) => Some(columns.as_slice()),
            _ => None,
        })
    }

    /// Detail filters, in list order.
    pub fn filters(&self) -> impl Iterator<Item = &Condition> {
        self.parameters.iter().filter_map(|p| match p {
            Parameter::Filter { condition, .. } => Some(condition),
            _ => None,
        })
    }

    /// Group rules as `(label, condition)`, in list order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.parameters.iter().filter_map(|p| match p {
            Parameter::Group {
                label, condition, ..
            } => Some((label.as_str(), condition)),
            _ => None,
        })
    }

    /// Aggregation parameter; `avg` when absent.
    pub fn aggregation(&self) -> Aggregation {
        self.parameters
            .iter()
            .find_map(|p| match p {
                Parameter::Aggregation(agg) => Some(*agg),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn year(&self) -> Option<&YearRange> {
        self.parameters.iter().find_map(|p| match p {
            Parameter::Year(range) => Some(range),
            _ => None,
        })
    }

    /// Selected area names; empty when unfiltered.
    pub fn areas(&self) -> &[String] {
        self.parameters
            .iter()
            .find_map(|p| match p {
                Parameter::Area(names) => Some(names.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}
