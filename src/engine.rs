//! Rule engine: compiles a rule set into lookup indices
//!
//! Construction runs once:
//!
//! 1. `Definition` rules are resolved into a rename map ([`Canonicalizer`])
//! 2. Every other rule is rewritten to canonical tags, and bidirectional
//!    operators are split into one-way rules
//! 3. Rules are grouped by operator
//! 4. `Specialization` rules feed the [`SpecializationIndex`]
//! 5. Tags carrying the abstract property are collected
//!
//! The engine is immutable afterwards; every query, including
//! [`analyze`](TagRuleEngine::analyze), only reads it.

use crate::canonical::Canonicalizer;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::hierarchy::SpecializationIndex;
use crate::info::TagInfo;
use crate::rule::{TagOperator, TagRule};
use crate::tag::validate_tags;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Compiled, immutable rule set
#[derive(Debug, Clone)]
pub struct TagRuleEngine {
    pub(crate) config: EngineConfig,
    pub(crate) canonical: Canonicalizer,
    pub(crate) hierarchy: SpecializationIndex,
    pub(crate) abstract_tags: BTreeSet<String>,
    pub(crate) rules: BTreeMap<TagOperator, Vec<TagRule>>,
    source_rules: Vec<TagRule>,
}

impl TagRuleEngine {
    /// Compile `rules` with the default configuration
    pub fn new(rules: impl IntoIterator<Item = TagRule>) -> Result<Self> {
        Self::with_config(rules, EngineConfig::default())
    }

    pub fn with_config(
        rules: impl IntoIterator<Item = TagRule>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let source_rules: Vec<TagRule> = rules.into_iter().collect();

        for rule in &source_rules {
            if config.validate_tags {
                validate_tags(rule.tags(), rule)?;
            }
            match rule.operator {
                TagOperator::Definition if rule.left.len() != 1 || rule.right.len() != 1 => {
                    return Err(Error::InvalidDefinition {
                        rule: rule.to_string(),
                    });
                }
                TagOperator::Specialization if rule.right.len() != 1 => {
                    return Err(Error::InvalidSpecialization {
                        rule: rule.to_string(),
                    });
                }
                _ => {}
            }
        }

        let canonical = Canonicalizer::new(&source_rules)?;

        let mut grouped: BTreeMap<TagOperator, Vec<TagRule>> = BTreeMap::new();
        for rule in normalize_rules(&source_rules, &canonical) {
            grouped.entry(rule.operator).or_default().push(rule);
        }

        let abstract_tags: BTreeSet<String> = grouped
            .get(&TagOperator::Property)
            .into_iter()
            .flatten()
            .filter(|rule| rule.right.contains(&config.abstract_property))
            .flat_map(|rule| rule.left.iter().cloned())
            .collect();

        let mut hierarchy = SpecializationIndex::new();
        for rule in grouped.get(&TagOperator::Specialization).into_iter().flatten() {
            let Some(parent) = rule.right.first() else {
                continue;
            };
            for child in &rule.left {
                if config.reject_specialization_cycles {
                    hierarchy.insert_acyclic(child, parent, rule)?;
                } else {
                    hierarchy.insert(child, parent, rule);
                }
            }
        }

        debug!(
            rules = source_rules.len(),
            normalized = grouped.values().map(Vec::len).sum::<usize>(),
            aliases = canonical.len(),
            hierarchy = hierarchy.len(),
            abstract_tags = abstract_tags.len(),
            "compiled tag rules"
        );

        Ok(Self {
            config,
            canonical,
            hierarchy,
            abstract_tags,
            rules: grouped,
            source_rules,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rules exactly as they were supplied
    pub fn source_rules(&self) -> &[TagRule] {
        &self.source_rules
    }

    /// Normalized one-way rules for `operator`. Bidirectional operators never
    /// have any after normalization.
    pub fn rules(&self, operator: TagOperator) -> &[TagRule] {
        self.rules.get(&operator).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Canonical form of `tag`
    pub fn rename<'a>(&'a self, tag: &'a str) -> &'a str {
        self.canonical.rename(tag)
    }

    /// Canonical forms of `tags`
    pub fn canonicalize<I, S>(&self, tags: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .map(|t| self.rename(t.as_ref()).to_string())
            .collect()
    }

    pub fn is_abstract(&self, tag: &str) -> bool {
        self.abstract_tags.contains(self.rename(tag))
    }

    /// Everything known about `tag`
    pub fn tag_info(&self, tag: &str) -> Result<TagInfo> {
        if tag.is_empty() {
            return Err(Error::EmptyTag);
        }

        let tag = self.rename(tag);
        Ok(TagInfo {
            tag: tag.to_string(),
            is_abstract: self.abstract_tags.contains(tag),
            aliases: self.tag_aliases(tag),
            properties: self.tag_properties(tag),
            parents: self.tag_parents(tag),
            children: self.tag_children(tag),
            ancestors: self.tag_ancestors(tag),
            descendants: self.tag_descendants(tag),
        })
    }

    pub fn tag_aliases(&self, tag: &str) -> BTreeSet<String> {
        self.canonical
            .aliases(self.rename(tag))
            .cloned()
            .unwrap_or_default()
    }

    pub fn tag_parents(&self, tag: &str) -> BTreeSet<String> {
        self.hierarchy.parents(self.rename(tag))
    }

    pub fn tag_children(&self, tag: &str) -> BTreeSet<String> {
        self.hierarchy
            .children(self.rename(tag))
            .cloned()
            .unwrap_or_default()
    }

    pub fn tag_ancestors(&self, tag: &str) -> BTreeSet<String> {
        self.hierarchy
            .ancestors(self.rename(tag))
            .cloned()
            .unwrap_or_default()
    }

    pub fn tag_descendants(&self, tag: &str) -> BTreeSet<String> {
        self.hierarchy
            .descendants(self.rename(tag))
            .cloned()
            .unwrap_or_default()
    }

    /// Properties declared directly on `tag`, in rule order
    pub fn tag_properties(&self, tag: &str) -> Vec<String> {
        let tag = self.rename(tag);
        self.rules(TagOperator::Property)
            .iter()
            .filter(|rule| rule.left.contains(tag))
            .flat_map(|rule| rule.right.iter().cloned())
            .collect()
    }

    /// Properties of every strict ancestor, nearest first, without the
    /// abstract marker. A property declared on several ancestors is repeated.
    pub fn inherited_tag_properties(&self, tag: &str) -> Vec<String> {
        let tag = self.rename(tag);
        let mut properties = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([tag]);
        let mut queue: VecDeque<&str> = VecDeque::from([tag]);

        while let Some(next) = queue.pop_front() {
            if next != tag {
                properties.extend(
                    self.tag_properties(next)
                        .into_iter()
                        .filter(|p| *p != self.config.abstract_property),
                );
            }
            if let Some(parents) = self.hierarchy.parent_rules(next) {
                for parent in parents.keys() {
                    if visited.insert(parent.as_str()) {
                        queue.push_back(parent.as_str());
                    }
                }
            }
        }

        properties
    }

    /// Own properties followed by inherited ones
    pub fn all_tag_properties(&self, tag: &str) -> Vec<String> {
        let mut properties = self.tag_properties(tag);
        properties.extend(self.inherited_tag_properties(tag));
        properties
    }

    /// Left sides of every suggestion rule that suggests `target`
    pub fn tag_sets_that_suggest(&self, target: &str) -> Vec<&BTreeSet<String>> {
        let target = self.rename(target);
        self.rules(TagOperator::Suggestion)
            .iter()
            .filter(|rule| rule.right.contains(target))
            .map(|rule| &rule.left)
            .collect()
    }

    /// Every tag mentioned by any rule, optionally in canonical form
    pub fn known_tags(&self, canonicalize: bool) -> BTreeSet<String> {
        self.source_rules
            .iter()
            .flat_map(|rule| rule.tags())
            .map(|tag| {
                if canonicalize {
                    self.rename(tag).to_string()
                } else {
                    tag.clone()
                }
            })
            .collect()
    }

    /// `tags` together with all of their ancestors
    pub fn tags_and_ancestors<'a>(
        &self,
        tags: impl IntoIterator<Item = &'a String>,
    ) -> BTreeSet<String> {
        with_closure(tags, |tag| self.hierarchy.ancestors(tag))
    }

    /// `tags` together with all of their descendants
    pub fn tags_and_descendants<'a>(
        &self,
        tags: impl IntoIterator<Item = &'a String>,
    ) -> BTreeSet<String> {
        with_closure(tags, |tag| self.hierarchy.descendants(tag))
    }
}

fn with_closure<'a, 'm>(
    tags: impl IntoIterator<Item = &'a String>,
    closure: impl Fn(&str) -> Option<&'m BTreeSet<String>>,
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    for tag in tags {
        if let Some(related) = closure(tag.as_str()) {
            result.extend(related.iter().cloned());
        }
        result.insert(tag.clone());
    }
    result
}

/// Rewrite rules to canonical tags and split bidirectional operators
///
/// `a & b <-> c` becomes `a & b -> c`, `c -> a` and `c -> b`: the reverse
/// direction is expanded pairwise rather than set-to-set. `Definition` rules
/// pass through untouched and `Property` right sides are never renamed.
fn normalize_rules(rules: &[TagRule], canonical: &Canonicalizer) -> Vec<TagRule> {
    let mut normalized = Vec::with_capacity(rules.len());

    for rule in rules {
        if rule.operator == TagOperator::Definition {
            normalized.push(rule.clone());
            continue;
        }

        let rename_all = |tags: &BTreeSet<String>| -> BTreeSet<String> {
            tags.iter()
                .map(|t| canonical.rename(t).to_string())
                .collect()
        };
        let left = rename_all(&rule.left);
        let right = match rule.operator {
            TagOperator::Property => rule.right.clone(),
            _ => rename_all(&rule.right),
        };

        match rule.operator.unidirectional() {
            Some(operator) => {
                normalized.push(TagRule {
                    left: left.clone(),
                    operator,
                    right: right.clone(),
                });
                for reverse_left in &right {
                    for reverse_right in &left {
                        normalized.push(TagRule::simple(reverse_left, operator, reverse_right));
                    }
                }
            }
            None => normalized.push(TagRule {
                left,
                operator: rule.operator,
                right,
            }),
        }
    }

    normalized
}
