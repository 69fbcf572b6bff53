//! Property-based tests for the rule engine
//!
//! Uses proptest to generate random rule sets over a small vocabulary and
//! verify the closure, canonicalization and suggestion invariants

use proptest::prelude::*;
use std::collections::BTreeSet;
use tagrules::{TagOperator, TagRule, TagRuleEngine};

const TAGS: [&str; 8] = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"];
const ALIASES: [&str; 3] = ["a0", "a1", "a2"];

fn tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TAGS.to_vec())
}

fn tag_set(max: usize) -> impl Strategy<Value = BTreeSet<&'static str>> {
    prop::collection::btree_set(tag(), 1..=max)
}

fn any_rule() -> impl Strategy<Value = TagRule> {
    prop_oneof![
        // Children always have a higher index than their parent.
        (1..TAGS.len())
            .prop_flat_map(|child| (Just(child), 0..child))
            .prop_map(|(child, parent)| TagRule::simple(
                TAGS[child],
                TagOperator::Specialization,
                TAGS[parent]
            )),
        (prop::sample::select(ALIASES.to_vec()), tag())
            .prop_map(|(alias, target)| TagRule::simple(alias, TagOperator::Definition, target)),
        (tag_set(2), tag_set(2))
            .prop_map(|(l, r)| TagRule::new(l, TagOperator::Implication, r)),
        (tag_set(1), tag_set(2))
            .prop_map(|(l, r)| TagRule::new(l, TagOperator::BidirectionalImplication, r)),
        (tag_set(2), tag_set(2))
            .prop_map(|(l, r)| TagRule::new(l, TagOperator::Suggestion, r)),
        (tag_set(2), tag_set(2))
            .prop_map(|(l, r)| TagRule::new(l, TagOperator::Exclusion, r)),
        (tag(), tag())
            .prop_map(|(l, r)| TagRule::simple(l, TagOperator::MutualExclusion, r)),
        tag().prop_map(|t| TagRule::simple(t, TagOperator::Property, "abstract")),
    ]
}

fn any_engine() -> impl Strategy<Value = TagRuleEngine> {
    prop::collection::vec(any_rule(), 0..24)
        .prop_map(|rules| TagRuleEngine::new(rules).expect("generated rules are well formed"))
}

fn any_input() -> impl Strategy<Value = Vec<&'static str>> {
    let word = prop_oneof![tag(), prop::sample::select(ALIASES.to_vec())];
    prop::collection::vec(word, 0..5)
}

proptest! {
    #[test]
    fn test_closures_are_mutual_inverses(engine in any_engine()) {
        for tag in TAGS {
            for ancestor in engine.tag_ancestors(tag) {
                prop_assert!(engine.tag_descendants(&ancestor).contains(tag));
                // Transitivity: an ancestor's ancestors are ancestors too.
                for grand in engine.tag_ancestors(&ancestor) {
                    prop_assert!(engine.tag_ancestors(tag).contains(&grand));
                }
            }
            for descendant in engine.tag_descendants(tag) {
                prop_assert!(engine.tag_ancestors(&descendant).contains(tag));
            }
            for parent in engine.tag_parents(tag) {
                prop_assert!(engine.tag_ancestors(tag).contains(&parent));
                prop_assert!(engine.tag_children(&parent).contains(tag));
            }
        }
    }

    #[test]
    fn test_rename_is_idempotent(engine in any_engine()) {
        for tag in TAGS.iter().chain(ALIASES.iter()) {
            let once = engine.rename(tag).to_string();
            prop_assert_eq!(engine.rename(&once), once.as_str());
        }
    }

    #[test]
    fn test_effective_tags_are_closed_under_ancestors(
        engine in any_engine(),
        input in any_input(),
    ) {
        let result = engine.analyze(&input);

        prop_assert!(result.normalized_tags.is_subset(&result.effective_tags));
        for tag in &result.effective_tags {
            for ancestor in engine.tag_ancestors(tag) {
                prop_assert!(result.effective_tags.contains(&ancestor));
            }
        }
    }

    #[test]
    fn test_satisfied_rules_contribute_nothing(
        engine in any_engine(),
        input in any_input(),
    ) {
        let result = engine.analyze(&input);

        for missing in &result.missing_tag_sets {
            let rule = missing.rule().expect("missing sets carry provenance");
            prop_assert!(rule.right.is_disjoint(&result.effective_tags));
            prop_assert!(!missing.result.is_empty());
        }
        for suggestion in &result.suggested_tags {
            let rule = suggestion.rule().expect("suggestions carry provenance");
            if matches!(rule.operator, TagOperator::Suggestion | TagOperator::Implication) {
                prop_assert!(rule.right.is_disjoint(&result.effective_tags));
            }
        }
    }

    #[test]
    fn test_rejected_tags_are_never_proposed(
        engine in any_engine(),
        input in any_input(),
        rejected in prop::collection::vec(tag(), 1..3),
    ) {
        let result = engine.analyze_with_rejected(&input, &rejected);
        let forbidden = engine.tags_and_descendants(&engine.canonicalize(&rejected));

        for suggestion in &result.suggested_tags {
            prop_assert!(!forbidden.contains(&suggestion.result));
        }
        for missing in &result.missing_tag_sets {
            prop_assert!(missing.result.is_disjoint(&forbidden));
        }
    }

    #[test]
    fn test_abstract_tags_are_never_suggested(
        engine in any_engine(),
        input in any_input(),
    ) {
        let result = engine.analyze(&input);

        for suggestion in &result.suggested_tags {
            prop_assert!(!engine.is_abstract(&suggestion.result));
            prop_assert!(!suggestion.rules.is_empty());
        }
    }

    #[test]
    fn test_analysis_is_deterministic(
        engine in any_engine(),
        input in any_input(),
    ) {
        prop_assert_eq!(engine.analyze(&input), engine.analyze(&input));
    }
}
