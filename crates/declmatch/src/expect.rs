//! Relational expectations: `Expect::new(v).le()` matches any actual value
//! `<= v`; `ExpectNot::new(v).le()` matches its negation.

use crate::patterns::{Pattern, Predicate};
use declmatch_value::{Relation, Value};

/// Failure reason for a relation, looked up by operator tag.
pub(crate) fn failure_reason(relation: Relation, negated: bool) -> &'static str {
    if negated {
        match relation {
            Relation::Eq => "equals (not expected)",
            Relation::Ne => "not equals (expected)",
            Relation::Gt => "lower (not expected)",
            Relation::Ge => "lower or equal (not expected)",
            Relation::Lt => "greater or equal (not expected)",
            Relation::Le => "greater (not expected)",
            Relation::Contains => "contains (not expected)",
            Relation::StartsWith => "starts with (not expected)",
            Relation::EndsWith => "ends with (not expected)",
            Relation::Matches => "matches (not expected)",
        }
    } else {
        match relation {
            Relation::Eq => "not equals",
            Relation::Ne => "equals",
            Relation::Gt => "not greater than (expected)",
            Relation::Ge => "not greater or equal",
            Relation::Lt => "greater or equal (expected)",
            Relation::Le => "greater (expected)",
            Relation::Contains => "should contain",
            Relation::StartsWith => "should start with",
            Relation::EndsWith => "should end with",
            Relation::Matches => "should match",
        }
    }
}

macro_rules! relation_builders {
    ($ty:ident) => {
        impl $ty {
            pub fn new(operand: impl Into<Value>) -> Self {
                Self {
                    operand: operand.into(),
                }
            }

            pub fn operand(&self) -> &Value {
                &self.operand
            }

            /// Binds `relation` against the operand.
            pub fn relation(self, relation: Relation) -> Pattern {
                Pattern::Predicate(Predicate::relation(relation, Self::NEGATED, self.operand))
            }

            pub fn eq(self) -> Pattern {
                self.relation(Relation::Eq)
            }

            pub fn ne(self) -> Pattern {
                self.relation(Relation::Ne)
            }

            pub fn gt(self) -> Pattern {
                self.relation(Relation::Gt)
            }

            pub fn ge(self) -> Pattern {
                self.relation(Relation::Ge)
            }

            pub fn lt(self) -> Pattern {
                self.relation(Relation::Lt)
            }

            pub fn le(self) -> Pattern {
                self.relation(Relation::Le)
            }

            /// Substring for strings, element for arrays, key for objects.
            pub fn contains(self) -> Pattern {
                self.relation(Relation::Contains)
            }

            pub fn starts_with(self) -> Pattern {
                self.relation(Relation::StartsWith)
            }

            pub fn ends_with(self) -> Pattern {
                self.relation(Relation::EndsWith)
            }

            /// Regex search over a string actual.
            pub fn matches(self) -> Pattern {
                self.relation(Relation::Matches)
            }
        }
    };
}

/// Expects `actual <op> operand` to hold.
///
/// ```
/// use declmatch::{diff, pattern, Expect, Value};
///
/// let p = pattern!({"retries": (Expect::new(3).le())});
/// assert!(diff(&Value::from(serde_json::json!({"retries": 2})), &p).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Expect {
    operand: Value,
}

impl Expect {
    const NEGATED: bool = false;
}

relation_builders!(Expect);

/// Expects `actual <op> operand` not to hold.
#[derive(Debug, Clone)]
pub struct ExpectNot {
    operand: Value,
}

impl ExpectNot {
    const NEGATED: bool = true;
}

relation_builders!(ExpectNot);
