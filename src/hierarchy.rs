//! Specialization index
//!
//! Maintains the direct parent/child maps of the `::` hierarchy together with
//! their transitive closures. Closures are updated incrementally as each edge
//! is inserted, so they are exact after every insertion regardless of the
//! order in which edges arrive.
//!
//! The index does not reject cycles unless asked to. In a cyclic hierarchy a
//! tag is never recorded as its own ancestor or descendant, but the closures
//! are otherwise best-effort.

use crate::error::{Error, Result};
use crate::rule::TagRule;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

type TagMap = BTreeMap<String, BTreeSet<String>>;

/// Direct and transitive specialization relations
#[derive(Debug, Clone, Default)]
pub struct SpecializationIndex {
    /// child -> parent -> the first rule declaring the edge
    parents: BTreeMap<String, BTreeMap<String, TagRule>>,
    children: TagMap,
    ancestors: TagMap,
    descendants: TagMap,
}

impl SpecializationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child :: parent`, declared by `rule`
    pub fn insert(&mut self, child: &str, parent: &str, rule: &TagRule) {
        self.parents
            .entry(child.to_string())
            .or_default()
            .entry(parent.to_string())
            .or_insert_with(|| rule.clone());
        self.children
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());

        // Everything at or below `child` gains `parent` and its ancestors.
        let mut gained = self.ancestors.get(parent).cloned().unwrap_or_default();
        gained.insert(parent.to_string());
        propagate(child, &gained, &mut self.ancestors, |tag| {
            self.children.get(tag)
        });

        // Everything at or above `parent` gains `child` and its descendants.
        let mut gained = self.descendants.get(child).cloned().unwrap_or_default();
        gained.insert(child.to_string());
        let parents = &self.parents;
        propagate(parent, &gained, &mut self.descendants, |tag| {
            parents.get(tag).map(|p| p.keys())
        });
    }

    /// Like [`insert`](Self::insert), but refuse an edge that closes a cycle
    pub fn insert_acyclic(&mut self, child: &str, parent: &str, rule: &TagRule) -> Result<()> {
        if child == parent || self.is_ancestor(child, parent) {
            return Err(Error::SpecializationCycle {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }
        self.insert(child, parent, rule);
        Ok(())
    }

    /// True when `ancestor` is a strict ancestor of `tag`
    pub fn is_ancestor(&self, ancestor: &str, tag: &str) -> bool {
        self.ancestors
            .get(tag)
            .is_some_and(|set| set.contains(ancestor))
    }

    /// Direct parents of `tag` with the rule that declared each edge
    pub fn parent_rules(&self, tag: &str) -> Option<&BTreeMap<String, TagRule>> {
        self.parents.get(tag)
    }

    pub fn parents(&self, tag: &str) -> BTreeSet<String> {
        self.parents
            .get(tag)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn children(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.children.get(tag)
    }

    pub fn ancestors(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.ancestors.get(tag)
    }

    pub fn descendants(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.descendants.get(tag)
    }

    /// Number of tags taking part in at least one edge
    pub fn len(&self) -> usize {
        self.parents
            .keys()
            .chain(self.children.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Union `gained` into the closure entry of `start` and of every tag reachable
/// from it through `next`, visiting each tag once. A tag never gains itself.
fn propagate<'m, F, I>(start: &str, gained: &BTreeSet<String>, closure: &mut TagMap, next: F)
where
    F: Fn(&str) -> Option<I>,
    I: IntoIterator<Item = &'m String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::from([start.to_string()]);

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }

        let entry = closure.entry(current.clone()).or_default();
        entry.extend(gained.iter().filter(|t| **t != current).cloned());

        if let Some(next_tags) = next(&current) {
            queue.extend(next_tags.into_iter().cloned());
        }
    }
}
