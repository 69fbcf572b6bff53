//! Rule model: operators and the rules built from them
//!
//! A rule relates a set of tags on the left to a set of tags on the right
//! through a [`TagOperator`]. `Property` rules are the exception: their right
//! side holds opaque property strings rather than tags.
//!
//! ## Rule Syntax
//!
//! ```text
//! feline => cat              # Definition: feline is an alias of cat
//! cat :: mammal              # Specialization: cat is a kind of mammal
//! mammal -> hair             # Implication
//! cat & outdoors ~> collar   # Suggestion
//! indoors <!> outdoors       # MutualExclusion
//! mammal [abstract]          # Property
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Operators that can be applied between tags or sets of tags.
///
/// Declaration order is significant: it is the ordering used when rules are
/// grouped by operator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TagOperator {
    /// The left side is defined as the right side (alias).
    Definition,
    /// The left side and right side are mutually exclusive.
    MutualExclusion,
    /// The left side excludes the right side.
    Exclusion,
    /// The left side and the right side imply each other.
    BidirectionalImplication,
    /// The left side implies the right side.
    Implication,
    /// The left side and the right side suggest each other.
    BidirectionalSuggestion,
    /// The left side suggests the right side.
    Suggestion,
    /// The left side specializes the right side.
    Specialization,
    /// The left side has the properties listed on the right side.
    Property,
}

impl TagOperator {
    /// All operators, in declaration order
    pub const ALL: [TagOperator; 9] = [
        TagOperator::Definition,
        TagOperator::MutualExclusion,
        TagOperator::Exclusion,
        TagOperator::BidirectionalImplication,
        TagOperator::Implication,
        TagOperator::BidirectionalSuggestion,
        TagOperator::Suggestion,
        TagOperator::Specialization,
        TagOperator::Property,
    ];

    /// Infix symbol used in rule text. `Property` uses bracket syntax instead.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            TagOperator::Definition => Some("=>"),
            TagOperator::MutualExclusion => Some("<!>"),
            TagOperator::Exclusion => Some("!>"),
            TagOperator::BidirectionalImplication => Some("<->"),
            TagOperator::Implication => Some("->"),
            TagOperator::BidirectionalSuggestion => Some("<~>"),
            TagOperator::Suggestion => Some("~>"),
            TagOperator::Specialization => Some("::"),
            TagOperator::Property => None,
        }
    }

    /// The one-way operator a bidirectional operator splits into
    pub fn unidirectional(self) -> Option<TagOperator> {
        match self {
            TagOperator::MutualExclusion => Some(TagOperator::Exclusion),
            TagOperator::BidirectionalImplication => Some(TagOperator::Implication),
            TagOperator::BidirectionalSuggestion => Some(TagOperator::Suggestion),
            _ => None,
        }
    }

    pub fn is_bidirectional(self) -> bool {
        self.unidirectional().is_some()
    }
}

impl fmt::Display for TagOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => f.write_str(symbol),
            None => f.write_str("[]"),
        }
    }
}

impl FromStr for TagOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagOperator::ALL
            .into_iter()
            .find(|op| op.symbol() == Some(s))
            .ok_or_else(|| format!("Unknown tag operator: '{}'", s))
    }
}

/// A rule applying a [`TagOperator`] to two sets of tags
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct TagRule {
    /// Left operand tags
    pub left: BTreeSet<String>,

    /// Operator
    pub operator: TagOperator,

    /// Right operand tags, or property names for `Property` rules
    pub right: BTreeSet<String>,
}

impl TagRule {
    pub fn new<L, R>(left: L, operator: TagOperator, right: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            left: left.into_iter().map(Into::into).collect(),
            operator,
            right: right.into_iter().map(Into::into).collect(),
        }
    }

    /// Rule with a single tag on each side
    pub fn simple(left: &str, operator: TagOperator, right: &str) -> Self {
        Self::new([left], operator, [right])
    }

    /// Tags referenced by this rule; property names are not tags
    pub fn tags(&self) -> impl Iterator<Item = &String> {
        let right = match self.operator {
            TagOperator::Property => None,
            _ => Some(self.right.iter()),
        };
        self.left.iter().chain(right.into_iter().flatten())
    }
}

impl fmt::Display for TagRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = self.left.iter().map(String::as_str).collect::<Vec<_>>();
        let right = self.right.iter().map(String::as_str).collect::<Vec<_>>();
        match self.operator.symbol() {
            Some(symbol) => write!(f, "{} {} {}", left.join(" & "), symbol, right.join(" | ")),
            None => write!(f, "{} [{}]", left.join(" & "), right.join(", ")),
        }
    }
}
