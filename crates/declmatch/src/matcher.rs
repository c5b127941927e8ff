//! Recursive comparison of an actual tree against a pattern tree.

use crate::error::{AssertionFailure, MatchError, Path, Reason, Slot};
use crate::patterns::Pattern;
use declmatch_value::{values_equal, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Reject actual mapping keys the pattern does not name.
    pub strict_keys: bool,
    /// Compare sequences positionally instead of as permutations.
    pub check_order: bool,
    /// Longest sequence compared by exact matching when order is ignored.
    /// Longer sequences use a greedy multiset check, which skips the
    /// quadratic compatibility table but can report "different elements"
    /// for a real permutation when a broad pattern (e.g. `ANY`) precedes a
    /// narrower one: `[ANY, 1]` against `[1, 2]`.
    pub max_permutation_len: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            strict_keys: true,
            check_order: true,
            max_permutation_len: 64,
        }
    }
}

/// Compares actual trees against patterns and collects every mismatch.
///
/// # Example
///
/// ```
/// use declmatch::{pattern, Matcher, Value, ANY};
/// use serde_json::json;
///
/// let matcher = Matcher::new().strict_keys(false);
/// let actual = Value::from(json!({"id": 7, "name": "alice", "extra": true}));
///
/// assert!(matcher.diff(&actual, &pattern!({"id": ANY, "name": "alice"})).is_empty());
///
/// let errors = matcher.diff(&actual, &pattern!({"name": "bob"}));
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].path.to_string(), "name");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    options: MatchOptions,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn strict_keys(mut self, strict_keys: bool) -> Self {
        self.options.strict_keys = strict_keys;
        self
    }

    pub fn check_order(mut self, check_order: bool) -> Self {
        self.options.check_order = check_order;
        self
    }

    pub fn max_permutation_len(mut self, max_permutation_len: usize) -> Self {
        self.options.max_permutation_len = max_permutation_len;
        self
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// The matcher used below a mapping key: sequences there are compared
    /// ignoring order.
    pub(crate) fn unordered(&self) -> Matcher {
        self.check_order(false)
    }

    /// Compares `actual` against `pattern`, reporting mismatches relative to
    /// `path`.
    pub fn compare(&self, actual: &Value, pattern: &Pattern, path: &Path) -> Vec<MatchError> {
        trace!(path = %path, pattern = %pattern, "compare");
        match (pattern, actual) {
            (Pattern::Contains(contains), _) => contains.match_value(actual, path, self),
            (Pattern::DoesntContains(doesnt_contains), _) => {
                doesnt_contains.match_value(actual, path, self)
            }
            (Pattern::Mapping(expected), Value::Object(map)) => {
                self.compare_mappings(map, expected, path)
            }
            (Pattern::Sequence(expected), Value::Array(items)) => {
                self.compare_sequences(items, expected, path)
            }
            _ => self.compare_scalars(actual, pattern, path),
        }
    }

    /// Every mismatch between `actual` and `pattern`, without failing.
    pub fn diff(&self, actual: &Value, pattern: &Pattern) -> Vec<MatchError> {
        self.compare(actual, pattern, &Path::root())
    }

    /// Fails with every mismatch at once when `actual` does not match.
    pub fn assert_declarative(
        &self,
        actual: &Value,
        pattern: &Pattern,
    ) -> Result<(), AssertionFailure> {
        let errors = self.diff(actual, pattern);
        if errors.is_empty() {
            Ok(())
        } else {
            debug!(count = errors.len(), "declarative assertion failed");
            Err(AssertionFailure::new(errors))
        }
    }

    fn compare_scalars(&self, actual: &Value, pattern: &Pattern, path: &Path) -> Vec<MatchError> {
        let matched = match pattern {
            Pattern::Predicate(predicate) => {
                if predicate.test(actual) {
                    return Vec::new();
                }
                let expected = predicate
                    .operand()
                    .map(|v| Slot::Value(v.clone()))
                    .unwrap_or(Slot::NotSet);
                return vec![MatchError::new(
                    path.clone(),
                    Reason::Predicate(predicate.label().to_string()),
                    Slot::Value(actual.clone()),
                    expected,
                )];
            }
            Pattern::Wildcard(wildcard) => wildcard.accepts(actual),
            Pattern::Literal(expected) => values_equal(actual, expected),
            // Container kind mismatch: the whole subtree is one error.
            _ => false,
        };

        if matched {
            Vec::new()
        } else {
            vec![MatchError::new(
                path.clone(),
                Reason::DoesNotMatch,
                Slot::Value(actual.clone()),
                Slot::from_pattern(pattern),
            )]
        }
    }

    fn compare_mappings(
        &self,
        actual: &BTreeMap<String, Value>,
        expected: &BTreeMap<String, Pattern>,
        path: &Path,
    ) -> Vec<MatchError> {
        let mut errors = Vec::new();

        if self.options.strict_keys {
            for (key, value) in actual {
                if !expected.contains_key(key) {
                    errors.push(MatchError::new(
                        path.key(key),
                        Reason::NotExpected,
                        Slot::Value(value.clone()),
                        Slot::NotSet,
                    ));
                }
            }
        }

        let nested = self.unordered();
        for (key, pattern) in expected {
            let key_path = path.key(key);
            match actual.get(key) {
                Some(value) => errors.extend(nested.compare(value, pattern, &key_path)),
                None => errors.push(MatchError::new(
                    key_path,
                    Reason::NotFound,
                    Slot::NotSet,
                    Slot::from_pattern(pattern),
                )),
            }
        }

        errors
    }

    fn compare_sequences(&self, actual: &[Value], expected: &[Pattern], path: &Path) -> Vec<MatchError> {
        let mut errors = Vec::new();

        if actual.len() != expected.len() {
            errors.push(MatchError::new(
                path.clone(),
                Reason::LengthsDiffer,
                Slot::Value(Value::from(actual.len())),
                Slot::Value(Value::from(expected.len())),
            ));
        }

        if self.options.check_order {
            for (i, (item, pattern)) in actual.iter().zip(expected).enumerate() {
                errors.extend(self.compare(item, pattern, &path.index(i)));
            }
        } else if !self.is_permutation(actual, expected, path) {
            errors.push(MatchError::new(
                path.clone(),
                Reason::DifferentElements,
                Slot::Value(Value::Array(actual.to_vec())),
                Slot::Pattern(Pattern::Sequence(expected.to_vec())),
            ));
        }

        errors
    }

    /// Whether some ordering of `actual` matches `expected` element-wise.
    ///
    /// Exact up to `max_permutation_len` elements: a bipartite matching over
    /// the table of pattern/element compatibility.
    fn is_permutation(&self, actual: &[Value], expected: &[Pattern], path: &Path) -> bool {
        if actual.len() != expected.len() {
            return false;
        }

        if expected.len() > self.options.max_permutation_len {
            debug!(
                path = %path,
                len = expected.len(),
                limit = self.options.max_permutation_len,
                "sequence too long for permutation search, using multiset check"
            );
            return self.is_multiset_equal(actual, expected, path);
        }

        // compatible[i][j]: expected[i] accepts actual[j]
        let compatible: Vec<Vec<bool>> = expected
            .iter()
            .map(|pattern| {
                actual
                    .iter()
                    .enumerate()
                    .map(|(j, item)| self.compare(item, pattern, &path.index(j)).is_empty())
                    .collect()
            })
            .collect();

        let mut owner = vec![None; actual.len()];
        (0..expected.len()).all(|row| {
            let mut seen = vec![false; actual.len()];
            augment(&compatible, row, &mut owner, &mut seen)
        })
    }

    // Greedy: each pattern consumes the first unconsumed element it accepts.
    fn is_multiset_equal(&self, actual: &[Value], expected: &[Pattern], path: &Path) -> bool {
        let mut remaining: Vec<(usize, &Value)> = actual.iter().enumerate().collect();
        for pattern in expected {
            let found = remaining
                .iter()
                .position(|(j, item)| self.compare(item, pattern, &path.index(*j)).is_empty());
            match found {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => return false,
            }
        }
        remaining.is_empty()
    }
}

// Finds an element for pattern `row`, reassigning earlier patterns along an
// augmenting path when needed. `owner[col]` is the pattern holding element `col`.
fn augment(
    compatible: &[Vec<bool>],
    row: usize,
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for (col, &ok) in compatible[row].iter().enumerate() {
        if !ok || seen[col] {
            continue;
        }
        seen[col] = true;
        let free = match owner[col] {
            None => true,
            Some(other) => augment(compatible, other, owner, seen),
        };
        if free {
            owner[col] = Some(row);
            return true;
        }
    }

    false
}

/// [`Matcher::diff`] with default options.
pub fn diff(actual: &Value, pattern: &Pattern) -> Vec<MatchError> {
    Matcher::new().diff(actual, pattern)
}

/// [`Matcher::assert_declarative`] with default options.
pub fn assert_declarative(actual: &Value, pattern: &Pattern) -> Result<(), AssertionFailure> {
    Matcher::new().assert_declarative(actual, pattern)
}

/// Panics with every mismatch when `actual` does not match `pattern`.
///
/// Both arguments are converted with `Into`: `actual` into a
/// [`Value`](crate::Value) (e.g. from `serde_json::json!`), `pattern` into a
/// [`Pattern`](crate::Pattern). An optional third argument supplies the
/// [`Matcher`](crate::Matcher).
///
/// ```
/// use declmatch::{assert_declarative, pattern, Contains, Matcher};
/// use serde_json::json;
///
/// assert_declarative!(json!({"a": 1, "b": 2}), Contains::new(pattern!({"a": 1})));
/// assert_declarative!(json!([2, 1]), json!([1, 2]), Matcher::new().check_order(false));
/// ```
#[macro_export]
macro_rules! assert_declarative {
    ($actual:expr, $pattern:expr $(,)?) => {
        $crate::assert_declarative!($actual, $pattern, $crate::Matcher::new())
    };
    ($actual:expr, $pattern:expr, $matcher:expr $(,)?) => {
        if let ::std::result::Result::Err(failure) = $matcher.assert_declarative(
            &$crate::Value::from($actual),
            &$crate::Pattern::from($pattern),
        ) {
            ::std::panic!("declarative assertion failed:\n{}", failure);
        }
    };
}
