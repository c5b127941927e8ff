//! Partial matching: `Contains` requires a subset of the actual structure,
//! `DoesntContains` requires the absence of given keys or items.

use crate::error::{MatchError, Path, Reason, Slot};
use crate::matcher::Matcher;
use crate::patterns::Pattern;
use declmatch_value::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// Partial-match operator over mappings and sequences.
///
/// Against a mapping, only the keys named by the pattern are checked.
/// Against a sequence, every pattern item must be matched by a distinct
/// actual element, in any order. Candidates are assigned greedily: each item,
/// in pattern order, takes the first remaining element that matches it. This
/// is not an optimal assignment; an early broad item can take the only
/// element a later item would accept.
///
/// ```
/// use declmatch::{diff, pattern, Contains, Value};
/// use serde_json::json;
///
/// let actual = Value::from(json!({"items": [{"name": "item1"}, {"name": "item2"}]}));
/// let p = Contains::new(pattern!({"items": (Contains::new(pattern!([{"name": "item2"}])))}));
/// assert!(diff(&actual, &p.into()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Contains {
    inner: Box<Pattern>,
    recursive: bool,
    check_pairs: bool,
}

impl Contains {
    pub fn new(pattern: impl Into<Pattern>) -> Self {
        Self {
            inner: Box::new(pattern.into()),
            recursive: false,
            check_pairs: true,
        }
    }

    /// Apply partial matching at every nesting level, without wrapping each
    /// level in `Contains` by hand.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// When false, a mapping key only has to be present; its value is not
    /// compared.
    pub fn check_pairs(mut self, check_pairs: bool) -> Self {
        self.check_pairs = check_pairs;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.inner
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn checks_pairs(&self) -> bool {
        self.check_pairs
    }

    /// Whether `actual` satisfies this pattern under default options.
    pub fn is_satisfied_by(&self, actual: &Value) -> bool {
        self.match_value(actual, &Path::root(), &Matcher::new())
            .is_empty()
    }

    pub fn match_value(&self, actual: &Value, path: &Path, matcher: &Matcher) -> Vec<MatchError> {
        trace!(path = %path, recursive = self.recursive, "contains");
        match (self.inner.as_ref(), actual) {
            (Pattern::Contains(inner), _) => inner.match_value(actual, path, matcher),
            (Pattern::DoesntContains(inner), _) => inner.match_value(actual, path, matcher),
            (Pattern::Mapping(expected), Value::Object(map)) => {
                self.match_mapping(map, expected, path, matcher)
            }
            (Pattern::Sequence(expected), Value::Array(items)) => {
                self.match_sequence(items, expected, path, matcher)
            }
            (_, Value::Object(_) | Value::Array(_)) => vec![MatchError::new(
                path.clone(),
                Reason::DoesNotMatch,
                Slot::Value(actual.clone()),
                Slot::from_pattern(&self.inner),
            )],
            _ => vec![MatchError::new(
                path.clone(),
                Reason::ContainsUnsupported,
                Slot::Value(actual.clone()),
                Slot::Pattern(Pattern::Contains(self.clone())),
            )],
        }
    }

    // Same flags, new inner pattern.
    fn wrap(&self, pattern: &Pattern) -> Contains {
        Contains {
            inner: Box::new(pattern.clone()),
            recursive: self.recursive,
            check_pairs: self.check_pairs,
        }
    }

    fn match_mapping(
        &self,
        map: &BTreeMap<String, Value>,
        expected: &BTreeMap<String, Pattern>,
        path: &Path,
        matcher: &Matcher,
    ) -> Vec<MatchError> {
        let mut errors = Vec::new();
        let nested = matcher.unordered();

        for (key, pattern) in expected {
            let key_path = path.key(key);
            match (map.get(key), pattern) {
                (Some(value), _)
                    if self.recursive && pattern.is_container() && value.is_container() =>
                {
                    errors.extend(self.wrap(pattern).match_value(value, &key_path, &nested));
                }
                // An absent key contains nothing.
                (None, Pattern::DoesntContains(_)) => {}
                (None, _) => errors.push(MatchError::new(
                    key_path,
                    Reason::NotFound,
                    Slot::NotSet,
                    Slot::from_pattern(pattern),
                )),
                (Some(value), _) if pattern.is_operator() || self.check_pairs => {
                    errors.extend(nested.compare(value, pattern, &key_path));
                }
                (Some(_), _) => {}
            }
        }

        errors
    }

    fn match_sequence(
        &self,
        items: &[Value],
        expected: &[Pattern],
        path: &Path,
        matcher: &Matcher,
    ) -> Vec<MatchError> {
        if expected.len() > items.len() {
            return vec![MatchError::new(
                path.clone(),
                Reason::ListTooShort,
                Slot::Value(Value::Array(items.to_vec())),
                Slot::Pattern(Pattern::Sequence(expected.to_vec())),
            )];
        }

        let mut errors = Vec::new();
        let mut candidates: Vec<&Value> = items.iter().collect();

        for (i, pattern) in expected.iter().enumerate() {
            let item_path = path.index(i);
            let found = candidates
                .iter()
                .position(|candidate| self.item_errors(candidate, pattern, &item_path, matcher).is_empty());
            match found {
                Some(pos) => {
                    candidates.remove(pos);
                }
                None => errors.push(MatchError::new(
                    item_path,
                    Reason::NotFound,
                    Slot::NotSet,
                    Slot::from_pattern(pattern),
                )),
            }
        }

        errors
    }

    fn item_errors(
        &self,
        candidate: &Value,
        pattern: &Pattern,
        path: &Path,
        matcher: &Matcher,
    ) -> Vec<MatchError> {
        if self.recursive && pattern.is_container() {
            self.wrap(pattern).match_value(candidate, path, matcher)
        } else {
            matcher.compare(candidate, pattern, path)
        }
    }
}

/// Exclusion operator: the given mapping entries or sequence items must not
/// be present.
///
/// A forbidden entry is present when the key exists and its value matches
/// the forbidden pattern, so `{"a": ANY}` forbids the key altogether. A
/// forbidden sequence item is present when any actual element matches it,
/// wherever it sits.
#[derive(Debug, Clone)]
pub struct DoesntContains {
    inner: Box<Pattern>,
}

impl DoesntContains {
    pub fn new(pattern: impl Into<Pattern>) -> Self {
        Self {
            inner: Box::new(pattern.into()),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.inner
    }

    pub fn match_value(&self, actual: &Value, path: &Path, matcher: &Matcher) -> Vec<MatchError> {
        trace!(path = %path, "doesnt_contains");
        match (self.inner.as_ref(), actual) {
            (Pattern::Contains(_) | Pattern::DoesntContains(_), _) => {
                if matcher.compare(actual, &self.inner, path).is_empty() {
                    vec![MatchError::new(
                        path.clone(),
                        Reason::ShouldNotContain(self.inner.to_string()),
                        Slot::Value(actual.clone()),
                        Slot::NotSet,
                    )]
                } else {
                    Vec::new()
                }
            }
            (Pattern::Mapping(forbidden), Value::Object(map)) => {
                let mut errors = Vec::new();
                for (key, pattern) in forbidden {
                    let key_path = path.key(key);
                    if let Some(value) = map.get(key) {
                        if matcher.compare(value, pattern, &key_path).is_empty() {
                            errors.push(MatchError::new(
                                key_path,
                                Reason::ShouldNotContain(key.clone()),
                                Slot::Value(value.clone()),
                                Slot::NotSet,
                            ));
                        }
                    }
                }
                errors
            }
            (Pattern::Sequence(forbidden), Value::Array(items)) => {
                let mut errors = Vec::new();
                for pattern in forbidden {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = path.index(i);
                        if matcher.compare(item, pattern, &item_path).is_empty() {
                            errors.push(MatchError::new(
                                item_path,
                                Reason::ListShouldNotContain(pattern.to_string()),
                                Slot::Value(item.clone()),
                                Slot::NotSet,
                            ));
                        }
                    }
                }
                errors
            }
            // Other container kinds cannot hold the forbidden entries.
            (_, Value::Object(_) | Value::Array(_)) => Vec::new(),
            _ => vec![MatchError::new(
                path.clone(),
                Reason::DoesntContainsUnsupported,
                Slot::Value(actual.clone()),
                Slot::Pattern(Pattern::DoesntContains(self.clone())),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pattern, Expect, ANY, ANY_NOT_NONE};
    use serde_json::json;

    fn diff(actual: serde_json::Value, pattern: impl Into<Pattern>) -> Vec<MatchError> {
        Matcher::new().diff(&Value::from(actual), &pattern.into())
    }

    #[test]
    fn test_contains_mapping_subset() {
        assert!(diff(json!({"a": 1, "b": 2}), Contains::new(pattern!({"a": 1}))).is_empty());
    }

    #[test]
    fn test_contains_mapping_value_mismatch() {
        let errors = diff(json!({"a": 1, "b": 2}), Contains::new(pattern!({"a": 2})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "a");
        assert_eq!(errors[0].reason, Reason::DoesNotMatch);
    }

    #[test]
    fn test_contains_missing_key() {
        let errors = diff(json!({"a": 1}), Contains::new(pattern!({"z": 1})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::NotFound);
        assert!(errors[0].actual.is_not_set());
    }

    #[test]
    fn test_contains_without_pair_check() {
        let actual = json!({"a": 1, "b": 2});
        assert!(diff(actual.clone(), Contains::new(pattern!({"a": 2})).check_pairs(false)).is_empty());

        let errors = diff(actual, Contains::new(pattern!({"c": 2})).check_pairs(false));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::NotFound);
    }

    #[test]
    fn test_nested_contains_dict() {
        let actual = json!({"a": {"x": 1, "y": 2}, "b": {"x": 3, "y": 4}});
        let pattern = Contains::new(pattern!({
            "a": (Contains::new(pattern!({"x": 1}))),
            "b": (Contains::new(pattern!({"x": 3})))
        }));
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_non_recursive_contains_is_strict_below_first_level() {
        let actual = json!({"a": {"x": 1, "y": 2}});
        let errors = diff(actual, Contains::new(pattern!({"a": {"x": 1}})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::NotExpected);
        assert_eq!(errors[0].path.to_string(), "a.y");
    }

    #[test]
    fn test_recursive_contains() {
        let actual = json!({"a": {"b": 2, "c": {}}, "b": 3});
        let pattern = Contains::new(pattern!({"a": {"b": 2}, "b": 3})).recursive(true);
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_recursive_contains_fails() {
        let actual = json!({"a": {"b": 2, "c": {}}, "b": 3});
        let pattern = Contains::new(pattern!({"a": {"b": 3}, "b": 3})).recursive(true);
        let errors = diff(actual, pattern);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "a.b");
    }

    #[test]
    fn test_recursive_contains_through_sequences() {
        let actual = json!({"users": [{"id": 1, "name": "a", "tags": ["x", "y"]}, {"id": 2}]});
        let pattern = Contains::new(pattern!({"users": [{"tags": ["y"]}]})).recursive(true);
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_recursive_contains_keeps_leaf_patterns() {
        let actual = json!({"a": {"x": 1}, "b": [1], "tags": ["x", "y"]});
        let pattern = Contains::new(pattern!({
            "a": ANY,
            "b": ANY_NOT_NONE,
            "tags": (Expect::new("x").contains())
        }))
        .recursive(true);
        assert!(diff(actual.clone(), pattern).is_empty());

        let pattern = Contains::new(pattern!({"tags": (Expect::new("z").contains())})).recursive(true);
        let errors = diff(actual, pattern);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason.to_string(), "should contain");
        assert_eq!(errors[0].path.to_string(), "tags");
    }

    #[test]
    fn test_contains_sequence_any_order() {
        let actual = json!([{"name": "item1"}, {"name": "item2"}, 3]);
        let pattern = Contains::new(pattern!([3, {"name": "item2"}]));
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_contains_sequence_consumes_candidates() {
        let errors = diff(json!([1, 2]), Contains::new(pattern!([1, 1])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::NotFound);
        assert_eq!(errors[0].path.to_string(), "1");
    }

    #[test]
    fn test_contains_sequence_greedy_assignment() {
        // ANY takes the 1 first, leaving nothing for the literal.
        let errors = diff(json!([1, 2]), Contains::new(pattern!([ANY, 1])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "1");
    }

    #[test]
    fn test_contains_list_too_short() {
        let errors = diff(json!([1]), Contains::new(pattern!([1, 2])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::ListTooShort);
        assert!(errors[0].path.is_root());
    }

    #[test]
    fn test_contains_on_scalar() {
        let errors = diff(json!("1"), Contains::new("ads"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::ContainsUnsupported);
        assert_eq!(
            errors[0].reason.to_string(),
            "Contains can only be used with mappings or sequences"
        );
    }

    #[test]
    fn test_contains_kind_mismatch() {
        let errors = diff(json!([1, 2]), Contains::new(pattern!({"a": 1})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::DoesNotMatch);
    }

    #[test]
    fn test_contains_list_with_dicts() {
        let actual = json!({
            "test": [
                {"_id": "comments/1091324", "_key": "1091324", "_rev": "_gmsWn4e--B", "text": "Great post!"},
                {
                    "_id": "posts/1091323",
                    "_key": "1091323",
                    "_rev": "_gmsWn4e--A",
                    "comments": null,
                    "content": "This is my first post!",
                    "title": "First Post"
                }
            ]
        });
        let pattern = pattern!({
            "test": (Contains::new(pattern!([
                {"_id": ANY_NOT_NONE, "_key": ANY_NOT_NONE, "_rev": ANY_NOT_NONE, "text": "Great post!"},
                {
                    "_id": ANY_NOT_NONE,
                    "_key": ANY_NOT_NONE,
                    "_rev": ANY_NOT_NONE,
                    "comments": null,
                    "content": "This is my first post!",
                    "title": "First Post"
                }
            ])))
        });
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_contains_nested_lists() {
        let actual = json!({"test": [[{"_id": "c/1", "text": "Great post!"}], [{"_id": "p/1", "title": "First Post"}]]});
        let pattern = pattern!({
            "test": (Contains::new(pattern!([
                [{"_id": ANY_NOT_NONE, "title": "First Post"}],
                [{"_id": ANY_NOT_NONE, "text": "Great post!"}]
            ])))
        });
        assert!(diff(actual, pattern).is_empty());
    }

    #[test]
    fn test_is_satisfied_by() {
        let contains = Contains::new(pattern!({"a": 1}));
        assert!(contains.is_satisfied_by(&Value::from(json!({"a": 1, "b": 2}))));
        assert!(!contains.is_satisfied_by(&Value::from(json!({"b": 2}))));
        assert!(!contains.is_satisfied_by(&Value::from(5)));
    }

    #[test]
    fn test_contains_of_contains_delegates() {
        let pattern = Contains::new(Contains::new(pattern!({"a": 1})));
        assert!(diff(json!({"a": 1, "b": 2}), pattern).is_empty());
    }

    #[test]
    fn test_contains_missing_key_with_doesnt_contains() {
        let pattern = Contains::new(pattern!({"z": (DoesntContains::new(pattern!({"x": 1})))}));
        assert!(diff(json!({"a": 1}), pattern).is_empty());
    }

    #[test]
    fn test_doesnt_contains_mapping() {
        let actual = json!({"a": 1, "b": 2});
        assert!(diff(actual.clone(), DoesntContains::new(pattern!({"c": 3}))).is_empty());
        assert!(diff(actual.clone(), DoesntContains::new(pattern!({"a": 2}))).is_empty());

        let errors = diff(actual, DoesntContains::new(pattern!({"a": 1})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason.to_string(), "should not contain a");
        assert_eq!(errors[0].path.to_string(), "a");
    }

    #[test]
    fn test_doesnt_contains_wildcard_forbids_key() {
        let errors = diff(json!({"secret": "x"}), DoesntContains::new(pattern!({"secret": ANY})));
        assert_eq!(errors.len(), 1);
        assert!(diff(json!({"public": "x"}), DoesntContains::new(pattern!({"secret": ANY}))).is_empty());
    }

    #[test]
    fn test_doesnt_contains_sequence_membership() {
        let actual = json!({"items": [{"name": "item1"}, {"name": "item2"}]});
        assert!(diff(
            actual.clone(),
            pattern!({"items": (DoesntContains::new(pattern!([{"name": "item3"}])))})
        )
        .is_empty());

        let errors = diff(
            actual,
            pattern!({"items": (DoesntContains::new(pattern!([{"name": "item2"}])))}),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "items.1");
        assert_eq!(
            errors[0].reason.to_string(),
            r#"list should not contain {"name":"item2"}"#
        );
    }

    #[test]
    fn test_doesnt_contains_negative_cases() {
        assert!(!diff(json!([[1]]), DoesntContains::new(pattern!([[1]]))).is_empty());
        assert!(!diff(
            json!({"test": [{"test": 1}]}),
            DoesntContains::new(pattern!({"test": [{"test": 1}]}))
        )
        .is_empty());
        assert!(!diff(
            json!({"test": [{"test": 1}]}),
            pattern!({"test": (DoesntContains::new(pattern!([{"test": 1}])))})
        )
        .is_empty());
        assert!(!diff(
            json!({"test": {"test": [1]}}),
            DoesntContains::new(pattern!({"test": {"test": [1]}}))
        )
        .is_empty());
    }

    #[test]
    fn test_doesnt_contains_on_scalar() {
        let errors = diff(json!(3), DoesntContains::new(pattern!([3])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, Reason::DoesntContainsUnsupported);
    }

    #[test]
    fn test_doesnt_contains_negates_contains() {
        let pattern = DoesntContains::new(Contains::new(pattern!({"a": 1})));
        assert_eq!(diff(json!({"a": 1, "b": 2}), pattern.clone()).len(), 1);
        assert!(diff(json!({"a": 2}), pattern).is_empty());
    }
}
