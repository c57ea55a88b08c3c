//! Scope targets: references from sections and rules to other policy objects

use serde::{Deserialize, Serialize};

use crate::kinds::TargetType;

/// A reference to a group, service or other object that scopes a rule or
/// section.
///
/// Identity is `(target_type, target_id)`. The display name is reported by
/// the controller and never compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTarget {
    pub target_type: TargetType,
    pub target_id: String,
    /// Read-only name the controller resolves for the target
    #[serde(
        default,
        rename = "target_display_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl ScopeTarget {
    pub fn new(target_type: TargetType, target_id: impl Into<String>) -> Self {
        Self {
            target_type,
            target_id: target_id.into(),
            display_name: None,
        }
    }

    pub fn group(target_id: impl Into<String>) -> Self {
        Self::new(TargetType::Group, target_id)
    }

    pub fn service(target_id: impl Into<String>) -> Self {
        Self::new(TargetType::Service, target_id)
    }

    /// Whether both references point at the same object.
    pub fn same_target(&self, other: &ScopeTarget) -> bool {
        self.target_type == other.target_type && self.target_id == other.target_id
    }
}

/// Ordered comparison of scope lists.
///
/// Unlike tags, the order of scope targets is meaningful to the controller
/// and a reorder counts as a change.
pub fn scope_lists_equal(desired: &[ScopeTarget], remote: &[ScopeTarget]) -> bool {
    desired.len() == remote.len()
        && desired
            .iter()
            .zip(remote)
            .all(|(d, r)| d.same_target(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_ignored() {
        let mut remote = ScopeTarget::group("grp-1");
        remote.display_name = Some("grp1".to_string());
        assert!(scope_lists_equal(&[ScopeTarget::group("grp-1")], &[remote]));
    }

    #[test]
    fn test_order_matters() {
        let a = vec![ScopeTarget::group("grp-1"), ScopeTarget::group("grp-2")];
        let b = vec![ScopeTarget::group("grp-2"), ScopeTarget::group("grp-1")];
        assert!(!scope_lists_equal(&a, &b));
    }

    #[test]
    fn test_type_is_part_of_identity() {
        let a = vec![ScopeTarget::group("x")];
        let b = vec![ScopeTarget::service("x")];
        assert!(!scope_lists_equal(&a, &b));
    }

    #[test]
    fn test_length_mismatch() {
        let a = vec![ScopeTarget::group("grp-1")];
        assert!(!scope_lists_equal(&a, &[]));
    }
}
