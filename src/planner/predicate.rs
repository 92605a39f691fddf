//! Condition compilation.
//!
//! [`compile`] turns one [`Condition`] into a [`Predicate`]. It never fails:
//! an illegal `(type, operation)` pair, a missing operand or a half-specified
//! range yields [`Predicate::Degraded`], which adds nothing to a WHERE clause
//! and never matches inside a bucket CASE.

use thiserror::Error;

use crate::model::condition::{Condition, ConditionType, Operation};
use crate::sql::{col, Expr, ExprExt, Literal};
use crate::value::Value;

/// Comparison operators a condition can compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    fn from_operation(op: Operation) -> Option<Self> {
        match op {
            Operation::Eq => Some(CompareOp::Eq),
            Operation::NotEq => Some(CompareOp::Ne),
            Operation::Gt => Some(CompareOp::Gt),
            Operation::Lt => Some(CompareOp::Lt),
            Operation::Gte => Some(CompareOp::Gte),
            Operation::Lte => Some(CompareOp::Lte),
            _ => None,
        }
    }
}

/// One side of a range.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: Literal,
    pub inclusive: bool,
}

/// Why a condition compiled to nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegradeReason {
    #[error("operation {operation:?} is not defined for {column_type:?}")]
    IllegalOperation {
        column_type: ConditionType,
        operation: Operation,
    },

    #[error("condition has no value")]
    MissingValue,

    #[error("value {0:?} is not numeric")]
    NotNumeric(Value),

    #[error("range needs both bounds and both inclusivity flags")]
    IncompleteRange,

    #[error("condition names no column")]
    MissingColumn,

    #[error("column '{0}' is not in the catalog")]
    UnknownColumn(String),
}

/// A compiled condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: Literal,
    },
    /// `LIKE '%value%'`. Wildcards inside the value are left as typed.
    Like {
        column: String,
        pattern: String,
        negated: bool,
    },
    Range {
        column: String,
        lower: Bound,
        upper: Bound,
    },
    Degraded(DegradeReason),
}

impl Predicate {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Predicate::Degraded(_))
    }

    /// Boolean expression for this predicate; `None` when degraded.
    pub fn to_expr(&self) -> Option<Expr> {
        let expr = match self {
            Predicate::Compare { column, op, value } => {
                let value = Expr::Literal(value.clone());
                let column = col(column);
                match op {
                    CompareOp::Eq => column.eq(value),
                    CompareOp::Ne => column.ne(value),
                    CompareOp::Gt => column.gt(value),
                    CompareOp::Lt => column.lt(value),
                    CompareOp::Gte => column.gte(value),
                    CompareOp::Lte => column.lte(value),
                }
            }
            Predicate::Like {
                column,
                pattern,
                negated,
            } => {
                if *negated {
                    col(column).not_like(pattern.as_str())
                } else {
                    col(column).like(pattern.as_str())
                }
            }
            Predicate::Range {
                column,
                lower,
                upper,
            } => {
                let lo = Expr::Literal(lower.value.clone());
                let hi = Expr::Literal(upper.value.clone());
                let lower = if lower.inclusive {
                    col(column).gte(lo)
                } else {
                    col(column).gt(lo)
                };
                let upper = if upper.inclusive {
                    col(column).lte(hi)
                } else {
                    col(column).lt(hi)
                };
                lower.and(upper).paren()
            }
            Predicate::Degraded(_) => return None,
        };
        Some(expr)
    }
}

/// Compile `condition` against `column`.
///
/// Degraded results are logged at `warn` with their reason.
pub fn compile(column: &str, condition: &Condition) -> Predicate {
    let predicate = match try_compile(column, condition) {
        Ok(p) => p,
        Err(reason) => Predicate::Degraded(reason),
    };
    if let Predicate::Degraded(reason) = &predicate {
        tracing::warn!(column, %reason, "condition degraded to no-op");
    }
    predicate
}

fn try_compile(column: &str, c: &Condition) -> Result<Predicate, DegradeReason> {
    use ConditionType as T;
    use Operation as Op;

    let column = column.to_string();
    let illegal = || DegradeReason::IllegalOperation {
        column_type: c.reference_column_type,
        operation: c.operation,
    };

    match (c.reference_column_type, c.operation) {
        (T::Text, Op::Eq | Op::NotEq) => {
            let value = Literal::String(text_operand(c.value.as_ref())?);
            let op = CompareOp::from_operation(c.operation).ok_or_else(illegal)?;
            Ok(Predicate::Compare { column, op, value })
        }
        (T::Text, Op::Contains | Op::NotContains) => {
            let text = text_operand(c.value.as_ref())?;
            Ok(Predicate::Like {
                column,
                pattern: format!("%{text}%"),
                negated: c.operation == Op::NotContains,
            })
        }
        (T::Integer | T::Float, op) => {
            let op = CompareOp::from_operation(op).ok_or_else(illegal)?;
            let value = numeric_operand(c.value.as_ref())?;
            Ok(Predicate::Compare { column, op, value })
        }
        (T::Date, op) => {
            let op = CompareOp::from_operation(op).ok_or_else(illegal)?;
            let value = Literal::String(text_operand(c.value.as_ref())?);
            Ok(Predicate::Compare { column, op, value })
        }
        (T::IntegerRange | T::FloatRange, Op::Range) => {
            let (lower, upper) = range_bounds(c, numeric_operand)?;
            Ok(Predicate::Range {
                column,
                lower,
                upper,
            })
        }
        (T::DateRange, Op::Range) => {
            let (lower, upper) = range_bounds(c, |v| text_operand(v).map(Literal::String))?;
            Ok(Predicate::Range {
                column,
                lower,
                upper,
            })
        }
        (T::Boolean, Op::IsTrue | Op::IsFalse) => Ok(Predicate::Compare {
            column,
            op: CompareOp::Eq,
            value: Literal::Int(if c.operation == Op::IsTrue { 1 } else { 0 }),
        }),
        _ => Err(illegal()),
    }
}

fn text_operand(value: Option<&Value>) -> Result<String, DegradeReason> {
    value
        .and_then(Value::to_text)
        .ok_or(DegradeReason::MissingValue)
}

fn numeric_operand(value: Option<&Value>) -> Result<Literal, DegradeReason> {
    match value {
        None | Some(Value::Null) => Err(DegradeReason::MissingValue),
        Some(v) => v
            .to_numeric_literal()
            .ok_or_else(|| DegradeReason::NotNumeric(v.clone())),
    }
}

fn range_bounds(
    c: &Condition,
    operand: impl Fn(Option<&Value>) -> Result<Literal, DegradeReason>,
) -> Result<(Bound, Bound), DegradeReason> {
    let (Some(start), Some(last), Some(includes_start), Some(includes_last)) = (
        c.start_value.as_ref().filter(|v| !v.is_null()),
        c.last_value.as_ref().filter(|v| !v.is_null()),
        c.includes_start,
        c.includes_last,
    ) else {
        return Err(DegradeReason::IncompleteRange);
    };
    Ok((
        Bound {
            value: operand(Some(start))?,
            inclusive: includes_start,
        },
        Bound {
            value: operand(Some(last))?,
            inclusive: includes_last,
        },
    ))
}
