//! Tags and tag-set comparison
//!
//! Tags are unordered. The controller is free to return them in any order
//! (it typically sorts them), so "did the tags change" must be answered with
//! set equality rather than sequence equality.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A scoped label attached to a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    /// Optional namespace for the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// The label itself
    #[serde(rename = "tag")]
    pub value: String,
}

impl Tag {
    pub fn new(scope: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            value: value.into(),
        }
    }

    pub fn unscoped(value: impl Into<String>) -> Self {
        Self {
            scope: None,
            value: value.into(),
        }
    }

    /// Comparison key. An empty scope and a missing scope are the same tag.
    fn key(&self) -> (&str, &str) {
        (self.scope.as_deref().unwrap_or(""), self.value.as_str())
    }
}

/// Decide whether two tag collections are semantically equal.
///
/// Order and duplicates are ignored: `[a, b]`, `[b, a]` and `[a, b, a]` are
/// all the same set.
pub fn tags_equal(desired: &[Tag], remote: &[Tag]) -> bool {
    tag_keys(desired) == tag_keys(remote)
}

/// Sort and de-duplicate tags into the canonical order used on the wire.
pub fn normalize_tags(tags: &[Tag]) -> Vec<Tag> {
    let mut seen = BTreeSet::new();
    let mut normalized: Vec<Tag> = tags
        .iter()
        .filter(|tag| seen.insert(tag.key()))
        .cloned()
        .collect();
    normalized.sort_by(|a, b| a.key().cmp(&b.key()));
    normalized
}

fn tag_keys(tags: &[Tag]) -> BTreeSet<(&str, &str)> {
    tags.iter().map(Tag::key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(scope: &str, value: &str) -> Tag {
        Tag::new(scope, value)
    }

    #[test]
    fn test_order_is_ignored() {
        let a = vec![t("env", "prod"), t("team", "net")];
        let b = vec![t("team", "net"), t("env", "prod")];
        assert!(tags_equal(&a, &b));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let a = vec![t("env", "prod"), t("env", "prod")];
        let b = vec![t("env", "prod")];
        assert!(tags_equal(&a, &b));
    }

    #[test]
    fn test_different_values_differ() {
        let a = vec![t("env", "prod")];
        let b = vec![t("env", "dev")];
        assert!(!tags_equal(&a, &b));
    }

    #[test]
    fn test_extra_tag_differs() {
        let a = vec![t("env", "prod")];
        let b = vec![t("env", "prod"), t("team", "net")];
        assert!(!tags_equal(&a, &b));
        assert!(!tags_equal(&b, &a));
    }

    #[test]
    fn test_empty_scope_matches_missing_scope() {
        let a = vec![Tag::new("", "shared")];
        let b = vec![Tag::unscoped("shared")];
        assert!(tags_equal(&a, &b));
    }

    #[test]
    fn test_empty_sets_are_equal() {
        assert!(tags_equal(&[], &[]));
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let tags = vec![t("b", "2"), t("a", "1"), t("b", "2")];
        let normalized = normalize_tags(&tags);
        assert_eq!(normalized, vec![t("a", "1"), t("b", "2")]);
    }

    #[test]
    fn test_tag_wire_shape() {
        let json = serde_json::to_value(t("env", "prod")).unwrap();
        assert_eq!(json["scope"], "env");
        assert_eq!(json["tag"], "prod");
    }
}
