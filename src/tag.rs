//! Tag grammar and hierarchy relations
//!
//! Tags are case-sensitive, non-empty tokens of Unicode word characters,
//! `.` and `-`, never starting with `.` or `-`.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{BitAnd, BitOr};
use std::sync::LazyLock;

use crate::error::{Error, Result};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w.\-]*$").expect("tag pattern is a valid regex"));

/// Check whether `tag` matches the tag grammar
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_PATTERN.is_match(tag)
}

/// Validate every tag in `tags`, reporting the first offender against `rule`
pub(crate) fn validate_tags<'a>(
    tags: impl IntoIterator<Item = &'a String>,
    rule: &impl std::fmt::Display,
) -> Result<()> {
    match tags.into_iter().find(|t| !is_valid_tag(t)) {
        Some(tag) => Err(Error::InvalidTag {
            tag: tag.clone(),
            rule: rule.to_string(),
        }),
        None => Ok(()),
    }
}

/// Relationship between a tag and its relatives in the specialization
/// hierarchy. Values combine as bit flags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct HierarchyRelation(u8);

impl HierarchyRelation {
    /// No relationship; treated as uninitialized rather than a query
    pub const NONE: Self = Self(0);
    pub const ANCESTOR: Self = Self(1);
    pub const SELF: Self = Self(2);
    pub const DESCENDANT: Self = Self(4);
    pub const SELF_OR_ANCESTOR: Self = Self(Self::SELF.0 | Self::ANCESTOR.0);
    pub const SELF_OR_DESCENDANT: Self = Self(Self::SELF.0 | Self::DESCENDANT.0);
    pub const RELATED: Self = Self(Self::ANCESTOR.0 | Self::DESCENDANT.0);
    pub const SELF_OR_RELATED: Self = Self(Self::SELF.0 | Self::RELATED.0);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when every flag in `other` is set in `self`
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Select the tags related to `tag` under this relation
    pub fn select(
        self,
        tag: &str,
        ancestors: &BTreeSet<String>,
        descendants: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        if self.contains(Self::ANCESTOR) {
            tags.extend(ancestors.iter().cloned());
        }
        if self.contains(Self::SELF) {
            tags.insert(tag.to_string());
        }
        if self.contains(Self::DESCENDANT) {
            tags.extend(descendants.iter().cloned());
        }
        tags
    }
}

impl BitOr for HierarchyRelation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for HierarchyRelation {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
