//! The pattern tree: literals, containers, wildcards, predicates and
//! containment operators.

use crate::contains::{Contains, DoesntContains};
use crate::expect;
use declmatch_value::{Relation, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Matches any value, `null` included.
pub const ANY: Pattern = Pattern::Wildcard(Wildcard::Any);

/// Matches any value except `null`.
pub const ANY_NOT_NONE: Pattern = Pattern::Wildcard(Wildcard::AnyNotNone);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    Any,
    AnyNotNone,
}

impl Wildcard {
    pub fn accepts(self, actual: &Value) -> bool {
        match self {
            Wildcard::Any => true,
            Wildcard::AnyNotNone => !actual.is_null(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(Value),
    Mapping(BTreeMap<String, Pattern>),
    Sequence(Vec<Pattern>),
    Wildcard(Wildcard),
    Predicate(Predicate),
    Contains(Contains),
    DoesntContains(DoesntContains),
}

impl Pattern {
    pub fn mapping<K, P, I>(entries: I) -> Self
    where
        K: Into<String>,
        P: Into<Pattern>,
        I: IntoIterator<Item = (K, P)>,
    {
        Pattern::Mapping(
            entries
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }

    pub fn sequence<P, I>(items: I) -> Self
    where
        P: Into<Pattern>,
        I: IntoIterator<Item = P>,
    {
        Pattern::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// A predicate built from an arbitrary closure. `label` becomes the
    /// failure reason.
    pub fn predicate<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Pattern::Predicate(Predicate::custom(label, func))
    }

    /// True for the two containment operators, which the matcher delegates to.
    pub fn is_operator(&self) -> bool {
        matches!(self, Pattern::Contains(_) | Pattern::DoesntContains(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Pattern::Mapping(_) | Pattern::Sequence(_))
    }
}

// ============ Predicates ============

#[derive(Clone)]
enum Check {
    Relation {
        relation: Relation,
        negated: bool,
        operand: Value,
    },
    Custom {
        label: String,
        func: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    },
}

/// A one-argument test on the actual value, with the reason reported when
/// it fails.
#[derive(Clone)]
pub struct Predicate {
    check: Check,
}

impl Predicate {
    pub fn relation(relation: Relation, negated: bool, operand: Value) -> Self {
        Self {
            check: Check::Relation {
                relation,
                negated,
                operand,
            },
        }
    }

    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Check::Custom {
                label: label.into(),
                func: Arc::new(func),
            },
        }
    }

    pub fn label(&self) -> &str {
        match &self.check {
            Check::Relation {
                relation, negated, ..
            } => expect::failure_reason(*relation, *negated),
            Check::Custom { label, .. } => label.as_str(),
        }
    }

    /// The bound operand; custom predicates have none.
    pub fn operand(&self) -> Option<&Value> {
        match &self.check {
            Check::Relation { operand, .. } => Some(operand),
            Check::Custom { .. } => None,
        }
    }

    pub fn test(&self, actual: &Value) -> bool {
        match &self.check {
            Check::Relation {
                relation,
                negated,
                operand,
            } => match relation.evaluate(actual, operand) {
                Ok(holds) => holds != *negated,
                Err(e) => {
                    tracing::debug!(%relation, %actual, %operand, error = %e, "relation not evaluable");
                    false
                }
            },
            Check::Custom { func, .. } => func(actual),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.check {
            Check::Relation {
                relation,
                negated,
                operand,
            } => {
                let name = if *negated { "ExpectNot" } else { "Expect" };
                write!(f, "<{} {} {}>", name, relation, operand)
            }
            Check::Custom { label, .. } => write!(f, "<predicate: {}>", label),
        }
    }
}

// ============ Conversions ============

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Pattern::Sequence(items.into_iter().map(Pattern::from).collect()),
            Value::Object(map) => {
                Pattern::Mapping(map.into_iter().map(|(k, v)| (k, Pattern::from(v))).collect())
            }
            scalar => Pattern::Literal(scalar),
        }
    }
}

impl From<&Value> for Pattern {
    fn from(value: &Value) -> Self {
        Pattern::from(value.clone())
    }
}

impl From<serde_json::Value> for Pattern {
    fn from(json: serde_json::Value) -> Self {
        Pattern::from(Value::from(json))
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Pattern {
                fn from(v: $t) -> Self {
                    Pattern::Literal(Value::from(v))
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, &str, String
);

impl<T: Into<Pattern>> From<Vec<T>> for Pattern {
    fn from(items: Vec<T>) -> Self {
        Pattern::sequence(items)
    }
}

impl From<Wildcard> for Pattern {
    fn from(wildcard: Wildcard) -> Self {
        Pattern::Wildcard(wildcard)
    }
}

impl From<Predicate> for Pattern {
    fn from(predicate: Predicate) -> Self {
        Pattern::Predicate(predicate)
    }
}

impl From<Contains> for Pattern {
    fn from(contains: Contains) -> Self {
        Pattern::Contains(contains)
    }
}

impl From<DoesntContains> for Pattern {
    fn from(doesnt_contains: DoesntContains) -> Self {
        Pattern::DoesntContains(doesnt_contains)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(value) => write!(f, "{}", value),
            Pattern::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, pattern)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", Value::from(key.as_str()), pattern)?;
                }
                f.write_str("}")
            }
            Pattern::Sequence(items) => {
                f.write_str("[")?;
                for (i, pattern) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", pattern)?;
                }
                f.write_str("]")
            }
            Pattern::Wildcard(Wildcard::Any) => f.write_str("<ANY>"),
            Pattern::Wildcard(Wildcard::AnyNotNone) => f.write_str("<ANY_NOT_NONE>"),
            Pattern::Predicate(predicate) => write!(f, "{}", predicate),
            Pattern::Contains(contains) => write!(f, "<Contains: {}>", contains.pattern()),
            Pattern::DoesntContains(doesnt_contains) => {
                write!(f, "<DoesntContains: {}>", doesnt_contains.pattern())
            }
        }
    }
}

/// Builds a [`Pattern`] from JSON-like syntax.
///
/// Object values and array items must each be a single token tree: a
/// literal, an identifier such as `ANY`, a nested `{...}` / `[...]`, or any
/// other expression wrapped in parentheses (negative numbers included).
///
/// ```
/// use declmatch::{pattern, Contains, Expect, ANY};
///
/// let p = pattern!({
///     "name": ANY,
///     "age": (Expect::new(18).ge()),
///     "tags": ["a", "b"],
///     "owner": (Contains::new(pattern!({"id": 1}))),
///     "deleted": null
/// });
/// assert!(p.is_container());
/// ```
#[macro_export]
macro_rules! pattern {
    (null) => {
        $crate::Pattern::Literal($crate::Value::Null)
    };
    ({}) => {
        $crate::Pattern::Mapping(::std::collections::BTreeMap::new())
    };
    ({ $($key:literal : $value:tt),+ $(,)? }) => {
        $crate::Pattern::mapping([$(($key, $crate::pattern!($value))),+])
    };
    ([]) => {
        $crate::Pattern::Sequence(::std::vec::Vec::new())
    };
    ([ $($item:tt),+ $(,)? ]) => {
        $crate::Pattern::Sequence(::std::vec![$($crate::pattern!($item)),+])
    };
    ($other:expr) => {
        $crate::Pattern::from($other)
    };
}
