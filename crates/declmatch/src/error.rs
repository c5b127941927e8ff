//! Mismatch records produced by a match, and the aggregated assertion failure.

use crate::patterns::Pattern;
use declmatch_value::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Location of a node inside the actual tree. Displays dotted: `items.0.name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(PathSegment::Key(key.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Why a node failed to match. Each kind has a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    DoesNotMatch,
    NotFound,
    NotExpected,
    LengthsDiffer,
    DifferentElements,
    ListTooShort,
    ContainsUnsupported,
    DoesntContainsUnsupported,
    ShouldNotContain(String),
    ListShouldNotContain(String),
    /// Failure label of a predicate pattern.
    Predicate(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::DoesNotMatch => f.write_str("does not match"),
            Reason::NotFound => f.write_str("not found"),
            Reason::NotExpected => f.write_str("not expected"),
            Reason::LengthsDiffer => f.write_str("lengths differ"),
            Reason::DifferentElements => f.write_str("different elements (ignoring order)"),
            Reason::ListTooShort => f.write_str("list is too short"),
            Reason::ContainsUnsupported => {
                f.write_str("Contains can only be used with mappings or sequences")
            }
            Reason::DoesntContainsUnsupported => {
                f.write_str("DoesntContains can only be used with mappings or sequences")
            }
            Reason::ShouldNotContain(key) => write!(f, "should not contain {}", key),
            Reason::ListShouldNotContain(item) => write!(f, "list should not contain {}", item),
            Reason::Predicate(label) => f.write_str(label),
        }
    }
}

/// The actual or expected side of a mismatch.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Absent. Distinct from `null`.
    NotSet,
    Value(Value),
    Pattern(Pattern),
}

impl Slot {
    /// Literal patterns are reported as plain values.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        match pattern {
            Pattern::Literal(value) => Slot::Value(value.clone()),
            other => Slot::Pattern(other.clone()),
        }
    }

    pub fn is_not_set(&self) -> bool {
        matches!(self, Slot::NotSet)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Value(value)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::NotSet => f.write_str("<NOT_SET>"),
            Slot::Value(v) => write!(f, "{}", v),
            Slot::Pattern(p) => write!(f, "{}", p),
        }
    }
}

/// One recorded mismatch.
#[derive(Debug, Clone)]
pub struct MatchError {
    pub path: Path,
    pub reason: Reason,
    pub actual: Slot,
    pub expected: Slot,
}

impl MatchError {
    pub fn new(path: Path, reason: Reason, actual: Slot, expected: Slot) -> Self {
        Self {
            path,
            reason,
            actual,
            expected,
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {:?}, {}, {})",
            self.path.to_string(),
            self.reason.to_string(),
            self.actual,
            self.expected
        )
    }
}

/// Every mismatch of a failed declarative assertion, one per line.
#[derive(Error, Debug, Clone)]
#[error("{}", format_lines(.errors))]
pub struct AssertionFailure {
    errors: Vec<MatchError>,
}

impl AssertionFailure {
    pub fn new(errors: Vec<MatchError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[MatchError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<MatchError> {
        self.errors
    }
}

fn format_lines(errors: &[MatchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
