//! Scalar values shared by conditions, rows and query parameters.

use serde::{Deserialize, Serialize};

use crate::sql::Literal;

/// A dynamically typed scalar.
///
/// Serializes as the bare JSON value (`null`, a number or a string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Text is parsed, so `"25"` reads as `25`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Value::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text view of the value; numbers are rendered, NULL has none.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Real(f) => {
                let mut buffer = ryu::Buffer::new();
                Some(buffer.format(*f).to_string())
            }
            Value::Null => None,
        }
    }

    /// Numeric literal keeping integers integral.
    ///
    /// Text that parses as an integer becomes an integer literal, any other
    /// parsable text a float literal.
    pub fn to_numeric_literal(&self) -> Option<Literal> {
        match self {
            Value::Integer(n) => Some(Literal::Int(*n)),
            Value::Real(f) => Some(Literal::Float(*f)),
            Value::Text(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    Some(Literal::Int(n))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(Literal::Float)
                }
            }
            Value::Null => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Value> for Literal {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Literal::Null,
            Value::Integer(n) => Literal::Int(n),
            Value::Real(f) => Literal::Float(f),
            Value::Text(s) => Literal::String(s),
        }
    }
}
