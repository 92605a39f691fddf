// src/model/parameter.rs
//! View parameters.
//!
//! Parameters are persisted as an ordered list of `{key, type, value}`
//! objects. [`Parameter`] is the closed set of shapes the engine understands;
//! anything else decodes to [`Parameter::Unknown`] and is carried verbatim so
//! that it survives a save.

use serde::{Deserialize, Serialize};

use super::condition::Condition;

/// Key of the aggregation parameter.
pub const AGGREGATION_KEY: &str = "group_aggregation";
/// Key of the table column list.
pub const COLUMNS_KEY: &str = "columns";
/// Key of the reference-year filter.
pub const YEAR_KEY: &str = "year";
/// Key of the area filter.
pub const AREA_KEY: &str = "area";
/// Prefix of detail filter keys.
pub const FILTER_PREFIX: &str = "filter_";
/// Prefix of group condition keys.
pub const GROUP_PREFIX: &str = "group_";

/// Column selection slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSlot {
    XAxis,
    YAxis,
    /// Pie chart category column.
    Label,
    /// Pie chart value column.
    Value,
}

impl AxisSlot {
    pub fn key(&self) -> &'static str {
        match self {
            AxisSlot::XAxis => "xAxis",
            AxisSlot::YAxis => "yAxis",
            AxisSlot::Label => "label",
            AxisSlot::Value => "value",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "xAxis" => Some(AxisSlot::XAxis),
            "yAxis" => Some(AxisSlot::YAxis),
            "label" => Some(AxisSlot::Label),
            "value" => Some(AxisSlot::Value),
            _ => None,
        }
    }
}

/// Aggregation applied to the y column of each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Avg,
    Sum,
    Count,
}

/// Reference-year bounds, as four-digit year strings.
///
/// Either side may be absent or empty; each side applies independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl YearRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(Into::into),
            end: end.map(Into::into),
        }
    }

    /// First day of the start year, if a start year is set.
    pub fn start_date(&self) -> Option<String> {
        non_empty(&self.start).map(|y| format!("{y}-01-01"))
    }

    /// Last day of the end year, if an end year is set.
    pub fn end_date(&self) -> Option<String> {
        non_empty(&self.end).map(|y| format!("{y}-12-31"))
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Classification used by every engine stage to pick out the parameters it
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Filter,
    Group,
    Column,
    TableColumns,
    Aggregation,
    YearFilter,
    AreaFilter,
    Unknown,
}

/// The persisted `{key, type, value}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParameter {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A decoded view parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParameter", into = "RawParameter")]
pub enum Parameter {
    /// A single column bound to an axis slot.
    Column { slot: AxisSlot, column: String },
    /// Ordered table columns.
    TableColumns(Vec<String>),
    /// Detail filter; ANDed into the base predicate.
    Filter { key: String, condition: Condition },
    /// Labelled bucket rule. List order decides which label wins.
    Group {
        key: String,
        label: String,
        condition: Condition,
    },
    Aggregation(Aggregation),
    Year(YearRange),
    /// Area names matched against `area_group`.
    Area(Vec<String>),
    Unknown(RawParameter),
}

impl Parameter {
    pub fn column(slot: AxisSlot, column: &str) -> Self {
        Parameter::Column {
            slot,
            column: column.into(),
        }
    }

    pub fn table_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        Parameter::TableColumns(columns.into_iter().map(Into::into).collect())
    }

    /// Detail filter. `name` is appended to the `filter_` prefix.
    pub fn filter(name: &str, condition: Condition) -> Self {
        Parameter::Filter {
            key: format!("{FILTER_PREFIX}{name}"),
            condition,
        }
    }

    /// Group rule. `name` is appended to the `group_` prefix.
    pub fn group(name: &str, label: &str, condition: Condition) -> Self {
        Parameter::Group {
            key: format!("{GROUP_PREFIX}{name}"),
            label: label.into(),
            condition,
        }
    }

    pub fn areas<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Parameter::Area(names.into_iter().map(Into::into).collect())
    }

    /// Persisted key. Edits replace the parameter with the same key.
    pub fn key(&self) -> &str {
        match self {
            Parameter::Column { slot, .. } => slot.key(),
            Parameter::TableColumns(_) => COLUMNS_KEY,
            Parameter::Filter { key, .. } | Parameter::Group { key, .. } => key,
            Parameter::Aggregation(_) => AGGREGATION_KEY,
            Parameter::Year(_) => YEAR_KEY,
            Parameter::Area(_) => AREA_KEY,
            Parameter::Unknown(raw) => &raw.key,
        }
    }

    pub fn classify(&self) -> ParameterKind {
        match self {
            Parameter::Column { .. } => ParameterKind::Column,
            Parameter::TableColumns(_) => ParameterKind::TableColumns,
            Parameter::Filter { .. } => ParameterKind::Filter,
            Parameter::Group { .. } => ParameterKind::Group,
            Parameter::Aggregation(_) => ParameterKind::Aggregation,
            Parameter::Year(_) => ParameterKind::YearFilter,
            Parameter::Area(_) => ParameterKind::AreaFilter,
            Parameter::Unknown(_) => ParameterKind::Unknown,
        }
    }

    fn decode(raw: &RawParameter) -> Result<Self, String> {
        let key = raw.key.as_str();
        let value = raw.value.clone();
        let parsed = match (raw.kind.as_str(), key) {
            ("column", COLUMNS_KEY) => {
                let list: String = serde_json::from_value(value).map_err(|e| e.to_string())?;
                Parameter::TableColumns(
                    list.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(Into::into)
                        .collect(),
                )
            }
            ("column", _) => {
                let slot = AxisSlot::from_key(key).ok_or("unknown column slot")?;
                let column: String = serde_json::from_value(value).map_err(|e| e.to_string())?;
                Parameter::Column { slot, column }
            }
            ("filter", YEAR_KEY) => {
                Parameter::Year(serde_json::from_value(value).map_err(|e| e.to_string())?)
            }
            ("filter", AREA_KEY) => {
                Parameter::Area(serde_json::from_value(value).map_err(|e| e.to_string())?)
            }
            ("filter", _) if key.starts_with(FILTER_PREFIX) => Parameter::Filter {
                key: key.into(),
                condition: serde_json::from_value(value).map_err(|e| e.to_string())?,
            },
            ("group", _) if key.starts_with(GROUP_PREFIX) => {
                let mut object = match value {
                    serde_json::Value::Object(map) => map,
                    _ => return Err("group value is not an object".into()),
                };
                let label = match object.remove("label") {
                    Some(serde_json::Value::String(label)) => label,
                    _ => return Err("group condition has no label".into()),
                };
                Parameter::Group {
                    key: key.into(),
                    label,
                    condition: serde_json::from_value(serde_json::Value::Object(object))
                        .map_err(|e| e.to_string())?,
                }
            }
            (AGGREGATION_KEY, AGGREGATION_KEY) => {
                Parameter::Aggregation(serde_json::from_value(value).map_err(|e| e.to_string())?)
            }
            _ => return Err("unrecognized key/type combination".into()),
        };
        Ok(parsed)
    }
}

impl From<RawParameter> for Parameter {
    fn from(raw: RawParameter) -> Self {
        match Parameter::decode(&raw) {
            Ok(p) => p,
            Err(reason) => {
                tracing::warn!(key = %raw.key, kind = %raw.kind, %reason, "keeping undecodable parameter as unknown");
                Parameter::Unknown(raw)
            }
        }
    }
}

impl From<Parameter> for RawParameter {
    fn from(p: Parameter) -> Self {
        let key = p.key().to_string();
        let (kind, value) = match p {
            Parameter::Unknown(raw) => return raw,
            Parameter::Column { column, .. } => ("column", column.into()),
            Parameter::TableColumns(columns) => ("column", columns.join(",").into()),
            Parameter::Filter { condition, .. } => ("filter", to_json(&condition)),
            Parameter::Group {
                label, condition, ..
            } => {
                let mut value = to_json(&condition);
                if let serde_json::Value::Object(map) = &mut value {
                    map.insert("label".into(), label.into());
                }
                ("group", value)
            }
            Parameter::Aggregation(agg) => (AGGREGATION_KEY, to_json(&agg)),
            Parameter::Year(range) => ("filter", to_json(&range)),
            Parameter::Area(names) => ("filter", names.into()),
        };
        RawParameter {
            key,
            kind: kind.into(),
            value,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
