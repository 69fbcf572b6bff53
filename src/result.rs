//! Analysis results and rule provenance

use crate::rule::TagRule;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A result together with the rules that produced it
///
/// `rules` is ordered from the earliest contributing rule to the rule that
/// produced `result` directly, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct RuleResult<T> {
    pub rules: Vec<TagRule>,
    pub result: T,
}

impl<T> RuleResult<T> {
    pub fn new(rules: Vec<TagRule>, result: T) -> Self {
        Self { rules, result }
    }

    /// Result produced by a single rule
    pub fn from_rule(rule: TagRule, result: T) -> Self {
        Self {
            rules: vec![rule],
            result,
        }
    }

    /// The rule that produced the result directly
    pub fn rule(&self) -> Option<&TagRule> {
        self.rules.last()
    }
}

/// Concatenate provenance chains, keeping the first occurrence of each rule
pub(crate) fn merge_rules<'a>(chains: impl IntoIterator<Item = &'a [TagRule]>) -> Vec<TagRule> {
    let mut merged: Vec<TagRule> = Vec::new();
    for rule in chains.into_iter().flatten() {
        if !merged.contains(rule) {
            merged.push(rule.clone());
        }
    }
    merged
}

/// Outcome of analyzing one set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Input tags after alias resolution
    pub normalized_tags: BTreeSet<String>,

    /// Normalized tags plus all of their specialization ancestors
    pub effective_tags: BTreeSet<String>,

    /// Input tags that are rejected, directly or through an ancestor
    pub existing_rejected_tags: BTreeSet<String>,

    /// Exclusion rules whose forbidden combination is fully present
    pub violated_exclusions: Vec<TagRule>,

    /// Sets of tags of which at least one must be added
    pub missing_tag_sets: Vec<RuleResult<BTreeSet<String>>>,

    /// Concrete tags proposed for addition
    pub suggested_tags: Vec<RuleResult<String>>,
}

impl AnalysisResult {
    /// The all-empty result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized_tags.is_empty()
            && self.effective_tags.is_empty()
            && self.existing_rejected_tags.is_empty()
            && self.violated_exclusions.is_empty()
            && self.missing_tag_sets.is_empty()
            && self.suggested_tags.is_empty()
    }

    /// True when the input contradicts the rules or the rejected tags
    pub fn is_conflicted(&self) -> bool {
        !self.violated_exclusions.is_empty() || !self.existing_rejected_tags.is_empty()
    }

    /// Distinct suggested tags, without provenance
    pub fn suggested_tag_names(&self) -> BTreeSet<&str> {
        self.suggested_tags
            .iter()
            .map(|s| s.result.as_str())
            .collect()
    }
}
