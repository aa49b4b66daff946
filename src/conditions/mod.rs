//! Condition operators and their evaluation.
//!
//! Conditions compare a value read from a request or response against a
//! user-entered comparator. Values are loosely typed: `"200"` equals `200`
//! and `"abc"` is never greater than anything.

pub mod check;

pub use check::check_condition;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a condition or an iterator.
///
/// Unknown operator names are preserved so documents round-trip unchanged;
/// they never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    #[default]
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Contains,
    Regex,
    Unknown(String),
}

impl Operator {
    /// Operators accepted by iterator descriptors.
    pub const ITERATOR_OPERATORS: [Operator; 7] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterThanEqual,
        Operator::LessThan,
        Operator::LessThanEqual,
        Operator::Contains,
    ];

    /// Returns the document name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not-equal",
            Operator::GreaterThan => "greater-than",
            Operator::GreaterThanEqual => "greater-than-equal",
            Operator::LessThan => "less-than",
            Operator::LessThanEqual => "less-than-equal",
            Operator::Contains => "contains",
            Operator::Regex => "regex",
            Operator::Unknown(name) => name,
        }
    }

    /// Parses a document name; anything unrecognised becomes [`Operator::Unknown`].
    pub fn parse(name: &str) -> Self {
        match name {
            "equal" => Operator::Equal,
            "not-equal" => Operator::NotEqual,
            "greater-than" => Operator::GreaterThan,
            "greater-than-equal" => Operator::GreaterThanEqual,
            "less-than" => Operator::LessThan,
            "less-than-equal" => Operator::LessThanEqual,
            "contains" => Operator::Contains,
            "regex" => Operator::Regex,
            other => Operator::Unknown(other.to_string()),
        }
    }

    /// Whether the operator may be used by an iterator descriptor.
    pub fn is_iterator_operator(&self) -> bool {
        Self::ITERATOR_OPERATORS.contains(self)
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        Operator::parse(&name)
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
