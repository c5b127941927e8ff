//! Declarative structural matching for JSON-like trees.
//!
//! A pattern describes what an actual value should look like. Matching
//! collects every mismatch, each with its location, instead of stopping at
//! the first one.
//!
//! Patterns are built from:
//! - literals, mappings and sequences (compared structurally)
//! - wildcards: [`ANY`], [`ANY_NOT_NONE`]
//! - relations: [`Expect`] / [`ExpectNot`] (`Expect::new(5).le()`)
//! - custom predicates: [`Pattern::predicate`]
//! - partial matching: [`Contains`], [`DoesntContains`]
//!
//! # Example
//!
//! ```
//! use declmatch::{pattern, Contains, Expect, Matcher, Value, ANY_NOT_NONE};
//! use serde_json::json;
//!
//! let actual = Value::from(json!({
//!     "id": "users/42",
//!     "age": 25,
//!     "friends": [{"name": "Alice", "age": 21}],
//! }));
//!
//! let expected = pattern!({
//!     "id": ANY_NOT_NONE,
//!     "age": (Expect::new(18).ge()),
//!     "friends": (Contains::new(pattern!([{"name": "Alice"}])).recursive(true))
//! });
//!
//! let matcher = Matcher::new();
//! assert!(matcher.diff(&actual, &expected).is_empty());
//!
//! // Every mismatch is reported, with its dotted path.
//! let errors = matcher.diff(&actual, &pattern!({"id": null, "age": 30}));
//! assert_eq!(errors.len(), 3);
//! assert_eq!(errors[0].path.to_string(), "friends");
//! assert_eq!(errors[0].reason.to_string(), "not expected");
//! ```

mod contains;
mod error;
mod expect;
mod matcher;
mod patterns;
pub mod report;

pub use contains::{Contains, DoesntContains};
pub use declmatch_value::{EvalError, Relation, Value};
pub use error::{AssertionFailure, MatchError, Path, PathSegment, Reason, Slot};
pub use expect::{Expect, ExpectNot};
pub use matcher::{assert_declarative, diff, MatchOptions, Matcher};
pub use patterns::{Pattern, Predicate, Wildcard, ANY, ANY_NOT_NONE};
