// src/model/condition.rs
//! Filter and group conditions.
//!
//! A [`Condition`] mirrors the persisted JSON shape one-to-one so that a
//! condition with an illegal `(type, operation)` pair, a missing value or a
//! half-specified range still decodes. Legality is decided later by the
//! predicate compiler, which degrades instead of failing.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Declared type of a condition's operand(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    Text,
    Integer,
    Float,
    IntegerRange,
    FloatRange,
    Date,
    DateRange,
    Boolean,
    /// Anything this build does not know. Compiles to a degraded predicate.
    #[serde(other)]
    Unrecognized,
}

impl ConditionType {
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            ConditionType::IntegerRange | ConditionType::FloatRange | ConditionType::DateRange
        )
    }

    /// Float operands are the ones rescaled for percent columns.
    pub fn is_float(&self) -> bool {
        matches!(self, ConditionType::Float | ConditionType::FloatRange)
    }
}

/// Comparison requested by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "noteq")]
    NotEq,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "notContains")]
    NotContains,
    #[serde(rename = "range")]
    Range,
    #[serde(rename = "isTrue")]
    IsTrue,
    #[serde(rename = "isFalse")]
    IsFalse,
    #[serde(other)]
    Unrecognized,
}

/// A single filter or group condition.
///
/// `reference_column` is present on filter conditions; group conditions
/// always apply to the bucketed axis column and leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_column: Option<String>,
    pub reference_column_type: ConditionType,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes_last: Option<bool>,
}

impl Condition {
    fn bare(column_type: ConditionType, operation: Operation) -> Self {
        Self {
            reference_column: None,
            reference_column_type: column_type,
            operation,
            value: None,
            start_value: None,
            last_value: None,
            includes_start: None,
            includes_last: None,
        }
    }

    /// Single-operand condition (`eq`, `gt`, `contains`, ...).
    pub fn compare(column_type: ConditionType, operation: Operation, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(column_type, operation)
        }
    }

    /// Two-sided range; both bounds and both inclusivity flags are explicit.
    pub fn range(
        column_type: ConditionType,
        start: impl Into<Value>,
        includes_start: bool,
        last: impl Into<Value>,
        includes_last: bool,
    ) -> Self {
        Self {
            start_value: Some(start.into()),
            last_value: Some(last.into()),
            includes_start: Some(includes_start),
            includes_last: Some(includes_last),
            ..Self::bare(column_type, Operation::Range)
        }
    }

    /// `isTrue` / `isFalse` on a boolean column.
    pub fn boolean(is_true: bool) -> Self {
        let op = if is_true {
            Operation::IsTrue
        } else {
            Operation::IsFalse
        };
        Self::bare(ConditionType::Boolean, op)
    }

    /// Attach the column a filter applies to.
    pub fn on(mut self, column: &str) -> Self {
        self.reference_column = Some(column.into());
        self
    }

    /// Apply `f` to every numeric operand. Used for percent rescaling.
    pub fn map_numbers(mut self, f: impl Fn(f64) -> f64) -> Self {
        for slot in [&mut self.value, &mut self.start_value, &mut self.last_value] {
            if let Some(n) = slot.as_ref().and_then(Value::as_f64) {
                *slot = Some(Value::Real(f(n)));
            }
        }
        self
    }
}
