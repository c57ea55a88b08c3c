//! Firewall rules and their partial-update payload

use serde::{Deserialize, Serialize};

use crate::kinds::{Direction, IpProtocol, RuleAction};
use crate::scope::ScopeTarget;

/// A single match/action entry inside a section.
///
/// Rule order within a section is significant. The `id` is assigned by the
/// controller on first create and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub action: RuleAction,
    #[serde(default)]
    pub ip_protocol: IpProtocol,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub logged: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub rule_tag: String,
    #[serde(default)]
    pub sources: Vec<ScopeTarget>,
    /// Negate the source match
    #[serde(default)]
    pub sources_excluded: bool,
    #[serde(default)]
    pub destinations: Vec<ScopeTarget>,
    /// Negate the destination match
    #[serde(default)]
    pub destinations_excluded: bool,
    #[serde(default)]
    pub services: Vec<ScopeTarget>,
    #[serde(default)]
    pub applied_to: Vec<ScopeTarget>,
}

impl Rule {
    /// Create a rule pending creation (no id) with controller defaults.
    pub fn new(display_name: impl Into<String>, action: RuleAction) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            description: String::new(),
            action,
            ip_protocol: IpProtocol::default(),
            direction: Direction::default(),
            logged: false,
            disabled: false,
            notes: String::new(),
            rule_tag: String::new(),
            sources: Vec::new(),
            sources_excluded: false,
            destinations: Vec::new(),
            destinations_excluded: false,
            services: Vec::new(),
            applied_to: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Merge a partial update into this rule. Unset patch fields are left alone.
    pub fn apply_patch(&mut self, patch: &RulePatch) {
        macro_rules! merge {
            ($($field:ident),+) => {
                $( if let Some(value) = &patch.$field { self.$field = value.clone(); } )+
            };
        }
        merge!(
            display_name,
            description,
            action,
            ip_protocol,
            direction,
            logged,
            disabled,
            notes,
            rule_tag,
            sources,
            sources_excluded,
            destinations,
            destinations_excluded,
            services,
            applied_to
        );
    }
}

/// Partial update for a single rule: only fields that are `Some` change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_protocol: Option<IpProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<ScopeTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_excluded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<ScopeTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destinations_excluded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ScopeTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_to: Option<Vec<ScopeTarget>>,
}

impl RulePatch {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this patch sets, in declaration order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        macro_rules! collect {
            ($($field:ident),+) => {
                $( if self.$field.is_some() { fields.push(stringify!($field)); } )+
            };
        }
        collect!(
            display_name,
            description,
            action,
            ip_protocol,
            direction,
            logged,
            disabled,
            notes,
            rule_tag,
            sources,
            sources_excluded,
            destinations,
            destinations_excluded,
            services,
            applied_to
        );
        fields
    }
}
