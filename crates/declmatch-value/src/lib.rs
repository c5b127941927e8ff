//! JSON-like values and relational operators for declmatch.
//!
//! A [`Value`] is the actual tree a pattern is matched against:
//! - Null: `null`
//! - Booleans: `true`, `false`
//! - Numbers: `42`, `-3.14` (stored as `f64`, compared with an epsilon)
//! - Strings: `"hello"`
//! - Arrays: `[1, 2, 3]`
//! - Objects: `{"key": value, ...}` (keys unique, order irrelevant)
//!
//! A [`Relation`] is one of the binary operators an expectation can bind:
//! - Comparison: `eq`, `ne`, `gt`, `ge`, `lt`, `le`
//! - Membership: `contains` (substring, array element or object key)
//! - String ops: `starts_with`, `ends_with`, `matches`
//!
//! # Example
//!
//! ```
//! use declmatch_value::{Relation, Value};
//!
//! let actual = Value::from(42);
//! assert!(Relation::Gt.evaluate(&actual, &Value::from(0)).unwrap());
//! assert!(Relation::Le.evaluate(&actual, &Value::from(42.0)).unwrap());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============ Value Types ============

/// A node of the actual tree.
///
/// Numbers are `f64`, so integers are exact only up to 2^53. Larger integers
/// that round to the same `f64` compare equal: `9007199254740993` matches
/// `9007199254740992`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(EvalError::TypeError {
                expected: "number",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_string(&self) -> Result<&str, EvalError> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(EvalError::TypeError {
                expected: "string",
                got: self.type_name(),
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

/// Structural equality. Numbers are equal within `f64::EPSILON`, so `1` and
/// `1.0` compare equal; objects ignore key order.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a == b || (a - b).abs() < f64::EPSILON,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).map(|bv| values_equal(v, bv)).unwrap_or(false))
        }
        _ => false,
    }
}

// ============ Conversions ============

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Into::into).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// Integral floats render without a trailing `.0`.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}

// ============ Relations ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}

impl Relation {
    pub const ALL: [Relation; 10] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Gt,
        Relation::Ge,
        Relation::Lt,
        Relation::Le,
        Relation::Contains,
        Relation::StartsWith,
        Relation::EndsWith,
        Relation::Matches,
    ];

    /// Short operator name, as written by the builder methods.
    pub fn name(self) -> &'static str {
        match self {
            Relation::Eq => "eq",
            Relation::Ne => "ne",
            Relation::Gt => "gt",
            Relation::Ge => "ge",
            Relation::Lt => "lt",
            Relation::Le => "le",
            Relation::Contains => "contains",
            Relation::StartsWith => "starts_with",
            Relation::EndsWith => "ends_with",
            Relation::Matches => "matches",
        }
    }

    /// Evaluates `actual <op> operand`.
    pub fn evaluate(self, actual: &Value, operand: &Value) -> Result<bool, EvalError> {
        let (l, r) = (actual, operand);
        match self {
            Relation::Eq => Ok(values_equal(l, r)),
            Relation::Ne => Ok(!values_equal(l, r)),
            Relation::Lt => match (l, r) {
                (Value::String(ls), Value::String(rs)) => Ok(ls < rs),
                _ => Ok(l.as_number()? < r.as_number()?),
            },
            Relation::Le => match (l, r) {
                (Value::String(ls), Value::String(rs)) => Ok(ls <= rs),
                _ => Ok(l.as_number()? <= r.as_number()?),
            },
            Relation::Gt => match (l, r) {
                (Value::String(ls), Value::String(rs)) => Ok(ls > rs),
                _ => Ok(l.as_number()? > r.as_number()?),
            },
            Relation::Ge => match (l, r) {
                (Value::String(ls), Value::String(rs)) => Ok(ls >= rs),
                _ => Ok(l.as_number()? >= r.as_number()?),
            },
            Relation::Contains => match l {
                Value::String(haystack) => Ok(haystack.contains(r.as_string()?)),
                Value::Array(items) => Ok(items.iter().any(|v| values_equal(v, r))),
                Value::Object(map) => Ok(map.contains_key(r.as_string()?)),
                _ => Err(EvalError::TypeError {
                    expected: "string, array or object",
                    got: l.type_name(),
                }),
            },
            Relation::StartsWith => {
                let s = l.as_string()?;
                let prefix = r.as_string()?;
                Ok(s.starts_with(prefix))
            }
            Relation::EndsWith => {
                let s = l.as_string()?;
                let suffix = r.as_string()?;
                Ok(s.ends_with(suffix))
            }
            Relation::Matches => {
                let s = l.as_string()?;
                let pattern = r.as_string()?;
                let re = regex::Regex::new(pattern)
                    .map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
                Ok(re.is_match(s))
            }
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
