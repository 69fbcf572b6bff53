//! Alias resolution
//!
//! `Definition` rules (`from => to`) form a rename graph. Every source tag is
//! mapped to a canonical tag: the smallest terminal tag reachable from it, or
//! the smallest tag on the cycle when no terminal tag is reachable.

use crate::error::{Error, Result};
use crate::rule::{TagOperator, TagRule};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Rename and alias maps derived from `Definition` rules
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    renames: BTreeMap<String, String>,
    aliases: BTreeMap<String, BTreeSet<String>>,
}

impl Canonicalizer {
    /// Build the rename map from the `Definition` rules in `rules`
    pub fn new<'a>(rules: impl IntoIterator<Item = &'a TagRule>) -> Result<Self> {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for rule in rules {
            if rule.operator != TagOperator::Definition {
                continue;
            }
            let (Some(from), Some(to)) = (single(&rule.left), single(&rule.right)) else {
                return Err(Error::InvalidDefinition {
                    rule: rule.to_string(),
                });
            };
            graph.entry(from.clone()).or_default().insert(to.clone());
        }

        let mut canonicalizer = Self::default();
        for (from, targets) in &graph {
            let target = canonical_target(from, targets, &graph);
            if &target == from {
                continue;
            }
            canonicalizer
                .aliases
                .entry(target.clone())
                .or_default()
                .insert(from.clone());
            canonicalizer.renames.insert(from.clone(), target);
        }

        Ok(canonicalizer)
    }

    /// Canonical form of `tag`; unknown tags are returned unchanged
    pub fn rename<'a>(&'a self, tag: &'a str) -> &'a str {
        self.renames.get(tag).map(String::as_str).unwrap_or(tag)
    }

    /// Aliases of a canonical tag
    pub fn aliases(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.aliases.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

fn single(tags: &BTreeSet<String>) -> Option<&String> {
    match tags.len() {
        1 => tags.iter().next(),
        _ => None,
    }
}

fn canonical_target(
    from: &String,
    targets: &BTreeSet<String>,
    graph: &BTreeMap<String, BTreeSet<String>>,
) -> String {
    let mut terminals: BTreeSet<&String> = BTreeSet::new();
    let mut seen: HashSet<&String> = HashSet::from([from]);
    let mut queue: VecDeque<&String> = targets.iter().collect();

    while let Some(tag) = queue.pop_front() {
        if !seen.insert(tag) {
            continue;
        }
        match graph.get(tag) {
            Some(next) => queue.extend(next),
            None => {
                terminals.insert(tag);
            }
        }
    }

    let smallest = match terminals.first() {
        Some(tag) => Some(*tag),
        None => seen.into_iter().min(),
    };
    smallest.unwrap_or(from).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn define(from: &str, to: &str) -> TagRule {
        TagRule::simple(from, TagOperator::Definition, to)
    }

    #[test]
    fn test_simple_alias() {
        let rules = vec![define("feline", "cat")];
        let c = Canonicalizer::new(&rules).unwrap();

        assert_eq!(c.rename("feline"), "cat");
        assert_eq!(c.rename("cat"), "cat");
        assert_eq!(c.rename("dog"), "dog");
        assert!(c.aliases("cat").unwrap().contains("feline"));
        assert!(c.aliases("feline").is_none());
    }

    #[test]
    fn test_chain_resolves_to_terminal() {
        let rules = vec![define("kitty", "feline"), define("feline", "cat")];
        let c = Canonicalizer::new(&rules).unwrap();

        assert_eq!(c.rename("kitty"), "cat");
        assert_eq!(c.rename("feline"), "cat");
        let aliases = c.aliases("cat").unwrap();
        assert!(aliases.contains("kitty") && aliases.contains("feline"));
    }

    #[test]
    fn test_smallest_terminal_wins() {
        let rules = vec![define("puss", "zcat"), define("puss", "acat")];
        let c = Canonicalizer::new(&rules).unwrap();

        assert_eq!(c.rename("puss"), "acat");
    }

    #[test]
    fn test_pure_cycle_uses_smallest_visited() {
        let rules = vec![define("b", "c"), define("c", "a"), define("a", "b")];
        let c = Canonicalizer::new(&rules).unwrap();

        assert_eq!(c.rename("a"), "a");
        assert_eq!(c.rename("b"), "a");
        assert_eq!(c.rename("c"), "a");
        let aliases = c.aliases("a").unwrap();
        assert!(!aliases.contains("a"));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_rename_is_idempotent() {
        let rules = vec![
            define("kitty", "feline"),
            define("feline", "cat"),
            define("x", "y"),
            define("y", "x"),
        ];
        let c = Canonicalizer::new(&rules).unwrap();

        for tag in ["kitty", "feline", "cat", "x", "y", "dog"] {
            let once = c.rename(tag);
            assert_eq!(c.rename(once), once);
        }
    }

    #[test]
    fn test_multi_tag_definition_is_rejected() {
        let rules = vec![TagRule::new(["a", "b"], TagOperator::Definition, ["c"])];
        let err = Canonicalizer::new(&rules).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));

        let rules = vec![TagRule::new(["a"], TagOperator::Definition, ["b", "c"])];
        assert!(Canonicalizer::new(&rules).is_err());
    }
}
