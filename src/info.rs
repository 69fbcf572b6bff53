//! Read-only snapshot of everything the engine knows about one tag

use crate::tag::HierarchyRelation;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TagInfo {
    /// Canonical tag
    pub tag: String,
    pub is_abstract: bool,
    pub aliases: BTreeSet<String>,
    /// Own properties, in rule order
    pub properties: Vec<String>,
    pub parents: BTreeSet<String>,
    pub children: BTreeSet<String>,
    pub ancestors: BTreeSet<String>,
    pub descendants: BTreeSet<String>,
}

impl TagInfo {
    /// Tags standing in `relation` to this tag
    pub fn related_tags(&self, relation: HierarchyRelation) -> BTreeSet<String> {
        relation.select(&self.tag, &self.ancestors, &self.descendants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_tags() {
        let info = TagInfo {
            tag: "mammal".into(),
            is_abstract: true,
            aliases: BTreeSet::new(),
            properties: vec!["abstract".into()],
            parents: ["animal".to_string()].into(),
            children: ["cat".to_string()].into(),
            ancestors: ["animal".to_string(), "object".to_string()].into(),
            descendants: ["cat".to_string(), "kitten".to_string()].into(),
        };

        assert_eq!(info.related_tags(HierarchyRelation::SELF).len(), 1);
        assert_eq!(info.related_tags(HierarchyRelation::SELF_OR_ANCESTOR).len(), 3);
        assert_eq!(info.related_tags(HierarchyRelation::SELF_OR_DESCENDANT).len(), 3);
        assert_eq!(info.related_tags(HierarchyRelation::RELATED).len(), 4);
        assert_eq!(info.related_tags(HierarchyRelation::SELF_OR_RELATED).len(), 5);
        assert!(info.related_tags(HierarchyRelation::NONE).is_empty());
    }
}
