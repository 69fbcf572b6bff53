//! Tag analysis: closure, conflicts, and completion suggestions
//!
//! Given the tags on an item (and optionally tags the caller has rejected),
//! analysis:
//!
//! 1. Resolves aliases and adds every specialization ancestor
//! 2. Expands rejected tags to include their descendants
//! 3. Scans exclusion rules for hard conflicts and for tags that would
//!    complete a conflict
//! 4. Runs implication rules to a fixpoint, unit-propagation style: a rule
//!    with a single possible conclusion is applied immediately and the scan
//!    restarts, so one conclusion can unlock the next
//! 5. Collects suggestions from missing sets, suggestion rules and
//!    unrefined hierarchy nodes
//! 6. Replaces abstract suggestions by their concrete descendants
//!
//! Every missing set and suggestion carries the chain of rules that led to it.

use crate::engine::TagRuleEngine;
use crate::result::{merge_rules, AnalysisResult, RuleResult};
use crate::rule::{TagOperator, TagRule};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::{debug, trace};

impl TagRuleEngine {
    /// Analyze `tags`
    pub fn analyze<I, S>(&self, tags: I) -> AnalysisResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.analyze_with_rejected(tags, std::iter::empty::<&str>())
    }

    /// Analyze `tags`, treating `rejected` (and all their descendants) as
    /// tags that must not be suggested
    pub fn analyze_with_rejected<I, S, R, T>(&self, tags: I, rejected: R) -> AnalysisResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let normalized_tags = self.canonicalize(tags);
        let effective_tags = self.tags_and_ancestors(&normalized_tags);
        if effective_tags.is_empty() {
            return AnalysisResult::empty();
        }

        let rejected = self.tags_and_descendants(&self.canonicalize(rejected));
        let existing_rejected_tags: BTreeSet<String> =
            normalized_tags.intersection(&rejected).cloned().collect();

        let (violated_exclusions, single_excluded) = self.scan_exclusions(&effective_tags);
        let mut excluded = self.tags_and_descendants(&single_excluded);
        excluded.extend(rejected);

        let mut analysis = Analysis {
            engine: self,
            excluded,
            tags: effective_tags.clone(),
            provenance: BTreeMap::new(),
            suggestions: Suggestions::default(),
        };

        let missing_tag_sets = analysis.propagate_implications();
        for missing in &missing_tag_sets {
            for tag in &missing.result {
                analysis
                    .suggestions
                    .push(RuleResult::new(missing.rules.clone(), tag.clone()));
            }
        }
        analysis.apply_suggestion_rules();
        analysis.suggest_specializations();
        let suggested_tags = analysis.expand_abstract_suggestions();

        debug!(
            normalized = normalized_tags.len(),
            effective = effective_tags.len(),
            rejected = existing_rejected_tags.len(),
            violated = violated_exclusions.len(),
            missing = missing_tag_sets.len(),
            suggested = suggested_tags.len(),
            "analyzed tags"
        );

        AnalysisResult {
            normalized_tags,
            effective_tags,
            existing_rejected_tags,
            violated_exclusions,
            missing_tag_sets,
            suggested_tags,
        }
    }

    /// Split exclusion rules that apply to `tags` into those already violated
    /// and the tags that would complete a violation
    fn scan_exclusions(&self, tags: &BTreeSet<String>) -> (Vec<TagRule>, BTreeSet<String>) {
        let mut violated = Vec::new();
        let mut single_excluded = BTreeSet::new();

        for rule in self.rules(TagOperator::Exclusion) {
            if !rule.left.is_subset(tags) {
                continue;
            }
            let mut absent = rule.right.iter().filter(|t| !tags.contains(*t));
            match (absent.next(), absent.next()) {
                (None, _) => violated.push(rule.clone()),
                (Some(tag), None) => {
                    single_excluded.insert(tag.clone());
                }
                _ => {}
            }
        }

        (violated, single_excluded)
    }
}

/// Working state of one analysis
struct Analysis<'e> {
    engine: &'e TagRuleEngine,
    /// Tags that must never be proposed
    excluded: BTreeSet<String>,
    /// Effective tags plus every tag concluded by unit propagation
    tags: BTreeSet<String>,
    /// For concluded tags: the rules that concluded them
    provenance: BTreeMap<String, Vec<TagRule>>,
    suggestions: Suggestions,
}

impl Analysis<'_> {
    /// Provenance of `tags` followed by `rule`
    fn derive(&self, tags: &BTreeSet<String>, rule: &TagRule) -> Vec<TagRule> {
        let mut rules = merge_rules(
            tags.iter()
                .filter_map(|t| self.provenance.get(t))
                .map(Vec::as_slice),
        );
        if !rules.contains(rule) {
            rules.push(rule.clone());
        }
        rules
    }

    fn is_abstract(&self, tag: &str) -> bool {
        self.engine.abstract_tags.contains(tag)
    }

    /// Record `tag` and its ancestors as concluded by `rules`. Returns false
    /// if `tag` was already present.
    fn conclude(&mut self, tag: &str, rules: &[TagRule]) -> bool {
        if !self.tags.insert(tag.to_string()) {
            return false;
        }
        self.provenance.insert(tag.to_string(), rules.to_vec());

        let engine = self.engine;
        if let Some(ancestors) = engine.hierarchy.ancestors(tag) {
            for ancestor in ancestors {
                if self.tags.insert(ancestor.clone()) {
                    self.provenance.insert(ancestor.clone(), rules.to_vec());
                }
            }
        }
        true
    }

    /// Apply implication rules until no rule is left unsatisfied with a
    /// single possible conclusion
    ///
    /// Each round gathers every applicable rule whose right side is not yet
    /// met. Rules left with exactly one admissible tag are preferred over
    /// rules with a choice. The round stops at the first tag it concludes,
    /// and scanning restarts with the enlarged tag set. A round made only of
    /// rules with a choice concludes nothing and ends the fixpoint.
    fn propagate_implications(&mut self) -> Vec<RuleResult<BTreeSet<String>>> {
        let engine = self.engine;
        let mut missing = Vec::new();
        let mut rounds = 0usize;

        loop {
            rounds += 1;
            let (resolved, ambiguous): (Vec<_>, Vec<_>) = engine
                .rules(TagOperator::Implication)
                .iter()
                .filter(|rule| rule.left.is_subset(&self.tags) && rule.right.is_disjoint(&self.tags))
                .filter_map(|rule| {
                    let right: BTreeSet<String> =
                        rule.right.difference(&self.excluded).cloned().collect();
                    (!right.is_empty()).then_some((rule, right))
                })
                .partition(|(_, right)| right.len() == 1);

            let candidates = if resolved.is_empty() { ambiguous } else { resolved };
            if candidates.is_empty() {
                break;
            }

            let mut changed = false;
            for (rule, right) in candidates {
                let rules = self.derive(&rule.left, rule);
                let single = match right.len() {
                    1 => right.first().cloned(),
                    _ => None,
                };
                missing.push(RuleResult::new(rules.clone(), right));

                if let Some(tag) = single {
                    if self.conclude(&tag, &rules) {
                        trace!(rule = %rule, tag = %tag, "concluded tag");
                        changed = true;
                        break;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        debug!(rounds, missing = missing.len(), "implication fixpoint reached");
        missing
    }

    /// Suggestions from suggestion rules whose left side is present
    fn apply_suggestion_rules(&mut self) {
        let engine = self.engine;
        for rule in engine.rules(TagOperator::Suggestion) {
            if !rule.left.is_subset(&self.tags) || !rule.right.is_disjoint(&self.tags) {
                continue;
            }
            let rules = self.derive(&rule.left, rule);
            for tag in rule.right.difference(&self.excluded) {
                self.suggestions
                    .push(RuleResult::new(rules.clone(), tag.clone()));
            }
        }
    }

    /// For concrete tags none of whose descendants are present, suggest the
    /// concrete descendants that refine them
    fn suggest_specializations(&mut self) {
        let engine = self.engine;
        let hierarchy = &engine.hierarchy;
        let mut found = Vec::new();

        for tag in &self.tags {
            if self.is_abstract(tag) {
                continue;
            }
            let Some(descendants) = hierarchy.descendants(tag) else {
                continue;
            };
            if !descendants.is_disjoint(&self.tags) {
                continue;
            }

            let origin = self.provenance.get(tag).map(Vec::as_slice).unwrap_or(&[]);
            for child in descendants {
                if self.is_abstract(child) || self.excluded.contains(child) {
                    continue;
                }
                for (parent, edge) in hierarchy.parent_rules(child).into_iter().flatten() {
                    if parent == tag || hierarchy.is_ancestor(tag, parent) {
                        let rules = merge_rules([origin, std::slice::from_ref(edge)]);
                        found.push(RuleResult::new(rules, child.clone()));
                    }
                }
            }
        }

        for suggestion in found {
            self.suggestions.push(suggestion);
        }
    }

    /// Replace every abstract suggestion by the concrete, admissible tags
    /// below it, extending provenance with the specialization edges walked
    fn expand_abstract_suggestions(&mut self) -> Vec<RuleResult<String>> {
        let engine = self.engine;
        let hierarchy = &engine.hierarchy;
        let mut expanded = Suggestions::default();

        for suggestion in std::mem::take(&mut self.suggestions.items) {
            if !self.is_abstract(&suggestion.result) {
                expanded.push(suggestion);
                continue;
            }

            let mut visited: HashSet<String> = HashSet::from([suggestion.result.clone()]);
            let mut queue: VecDeque<(String, Vec<TagRule>)> =
                VecDeque::from([(suggestion.result, suggestion.rules)]);

            while let Some((tag, rules)) = queue.pop_front() {
                for child in hierarchy.children(&tag).into_iter().flatten() {
                    if !visited.insert(child.clone()) {
                        continue;
                    }
                    let edge = hierarchy
                        .parent_rules(child)
                        .and_then(|parents| parents.get(&tag));
                    let edge = edge.map(std::slice::from_ref).unwrap_or(&[]);
                    let child_rules = merge_rules([rules.as_slice(), edge]);

                    if !self.is_abstract(child) && !self.excluded.contains(child) {
                        expanded.push(RuleResult::new(child_rules.clone(), child.clone()));
                    }
                    queue.push_back((child.clone(), child_rules));
                }
            }
        }

        expanded.items
    }
}

/// Insertion-ordered suggestions without duplicates
#[derive(Default)]
struct Suggestions {
    items: Vec<RuleResult<String>>,
    seen: HashSet<RuleResult<String>>,
}

impl Suggestions {
    fn push(&mut self, suggestion: RuleResult<String>) {
        if self.seen.insert(suggestion.clone()) {
            self.items.push(suggestion);
        }
    }
}
