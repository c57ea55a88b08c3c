//! Desired-versus-remote comparison for sections and their rules
//!
//! Rules are matched by id. The plan depends on whether the remote order can
//! be kept:
//!
//! - same relative order, new rules only at the end: per-rule deletes,
//!   patches and creates ([`RulePlan::Incremental`])
//! - matched rules reordered, or a new rule placed before an existing one:
//!   one section-level full replace carrying the whole list
//!   ([`RulePlan::ReplaceAll`]), since rule order is only settable together
//!   with the section
//!
//! Nothing changed means [`RulePlan::Unchanged`] and no calls at all.

use std::collections::{HashMap, HashSet};

use policy_model::{Rule, RulePatch, Section, SectionPatch, scope_lists_equal, tags_equal};

/// Per-rule operations that keep the remote order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleChanges {
    /// Remote rule ids with no desired counterpart, in remote order
    pub deletes: Vec<String>,
    /// Field changes for matched rules, in desired order
    pub patches: Vec<(String, RulePatch)>,
    /// New rules, appended in this order
    pub creates: Vec<Rule>,
}

impl RuleChanges {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.patches.is_empty() && self.creates.is_empty()
    }
}

/// Operations needed to bring a section's remote rules to the desired list.
#[derive(Debug, Clone, PartialEq)]
pub enum RulePlan {
    Unchanged,
    Incremental(RuleChanges),
    /// Replace the whole rule list, in this order, with one section update
    ReplaceAll(Vec<Rule>),
}

impl RulePlan {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RulePlan::Unchanged)
    }
}

/// Plan the rule operations for one section.
pub fn plan_rules(desired: &[Rule], remote: &[Rule]) -> RulePlan {
    let remote_by_id: HashMap<&str, &Rule> =
        remote.iter().filter_map(|r| r.id().map(|id| (id, r))).collect();

    // Unknown ids cannot be addressed remotely; send those rules as new.
    let desired: Vec<Rule> = desired
        .iter()
        .map(|rule| match rule.id() {
            Some(id) if !remote_by_id.contains_key(id) => {
                tracing::warn!(
                    rule_id = id,
                    rule = %rule.display_name,
                    "Desired rule id not found remotely, creating it instead"
                );
                Rule {
                    id: None,
                    ..rule.clone()
                }
            }
            _ => rule.clone(),
        })
        .collect();

    let matched: Vec<&str> = desired.iter().filter_map(|r| r.id()).collect();
    let matched_set: HashSet<&str> = matched.iter().copied().collect();

    let kept_remote_order: Vec<&str> = remote
        .iter()
        .filter_map(|r| r.id())
        .filter(|id| matched_set.contains(id))
        .collect();

    let last_matched = desired.iter().rposition(|r| r.id().is_some());
    let inserts_before_existing = last_matched
        .is_some_and(|last| desired[..last].iter().any(|r| r.id().is_none()));

    if matched != kept_remote_order || inserts_before_existing {
        tracing::debug!(
            rules = desired.len(),
            "Rule order changed, replacing the full rule list"
        );
        return RulePlan::ReplaceAll(desired);
    }

    let deletes = remote
        .iter()
        .filter_map(|r| r.id())
        .filter(|id| !matched_set.contains(id))
        .map(str::to_string)
        .collect();

    let mut patches = Vec::new();
    let mut creates = Vec::new();
    for rule in desired {
        let remote_rule = rule.id().and_then(|id| remote_by_id.get(id)).copied();
        match remote_rule {
            Some(remote_rule) => {
                let patch = diff_rule(&rule, remote_rule);
                if !patch.is_empty()
                    && let Some(id) = remote_rule.id()
                {
                    patches.push((id.to_string(), patch));
                }
            }
            None => creates.push(rule),
        }
    }

    let changes = RuleChanges {
        deletes,
        patches,
        creates,
    };

    if changes.is_empty() {
        RulePlan::Unchanged
    } else {
        RulePlan::Incremental(changes)
    }
}

/// Fields of `desired` that differ from `remote`. Scope lists compare in
/// order; the controller-reported display names of targets are ignored.
pub fn diff_rule(desired: &Rule, remote: &Rule) -> RulePatch {
    let mut patch = RulePatch::default();

    macro_rules! plain {
        ($($field:ident),+) => {
            $( if desired.$field != remote.$field {
                patch.$field = Some(desired.$field.clone());
            } )+
        };
    }
    macro_rules! scoped {
        ($($field:ident),+) => {
            $( if !scope_lists_equal(&desired.$field, &remote.$field) {
                patch.$field = Some(desired.$field.clone());
            } )+
        };
    }

    plain!(
        display_name,
        description,
        action,
        ip_protocol,
        direction,
        logged,
        disabled,
        notes,
        rule_tag,
        sources_excluded,
        destinations_excluded
    );
    scoped!(sources, destinations, services, applied_to);

    patch
}

/// Fields of the section itself (not its rules, not its placement) that
/// differ from `remote`. Tags compare as sets.
pub fn diff_section(desired: &Section, remote: &Section) -> SectionPatch {
    let mut patch = SectionPatch::default();

    if desired.display_name != remote.display_name {
        patch.display_name = Some(desired.display_name.clone());
    }
    if desired.description != remote.description {
        patch.description = Some(desired.description.clone());
    }
    if desired.stateful != remote.stateful {
        patch.stateful = Some(desired.stateful);
    }
    if !tags_equal(&desired.tags, &remote.tags) {
        patch.tags = Some(desired.tags.clone());
    }
    if !scope_lists_equal(&desired.applied_to, &remote.applied_to) {
        patch.applied_to = Some(desired.applied_to.clone());
    }

    patch
}
