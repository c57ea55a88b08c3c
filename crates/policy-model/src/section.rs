//! Firewall sections, their partial-update payload and placement

use serde::{Deserialize, Serialize};

use crate::kinds::SectionType;
use crate::rule::Rule;
use crate::scope::ScopeTarget;
use crate::tag::Tag;

/// An ordered container of rules, itself ordered among sibling sections.
///
/// A section without an `id` is pending creation. `predecessor_ref` names the
/// sibling this section sits immediately after; `None` means "tail" on
/// create and "keep the current position" on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub section_type: SectionType,
    #[serde(default = "default_stateful")]
    pub stateful: bool,
    #[serde(default, rename = "tag")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub applied_to: Vec<ScopeTarget>,
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor_ref: Option<String>,
    /// Optimistic-concurrency counter maintained by the controller
    #[serde(default, rename = "_revision", skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
}

fn default_stateful() -> bool {
    true
}

impl Section {
    pub fn new(display_name: impl Into<String>, section_type: SectionType) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            description: String::new(),
            section_type,
            stateful: default_stateful(),
            tags: Vec::new(),
            applied_to: Vec::new(),
            rules: Vec::new(),
            predecessor_ref: None,
            revision: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_applied_to(mut self, applied_to: Vec<ScopeTarget>) -> Self {
        self.applied_to = applied_to;
        self
    }

    pub fn after(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessor_ref = Some(predecessor.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Short label for log lines and error messages.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{} ({})", self.display_name, id),
            None => self.display_name.clone(),
        }
    }

    /// Merge a partial update into this section. Unset patch fields are left
    /// alone; a placement rewrites `predecessor_ref`.
    pub fn apply_patch(&mut self, patch: &SectionPatch) {
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(stateful) = patch.stateful {
            self.stateful = stateful;
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(applied_to) = &patch.applied_to {
            self.applied_to = applied_to.clone();
        }
        if let Some(placement) = &patch.placement {
            self.predecessor_ref = placement.predecessor().map(str::to_string);
        }
    }
}

/// Where a section sits relative to its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "section_id")]
pub enum Placement {
    /// No predecessor: the section starts its own chain
    Unanchored,
    /// Immediately after the named sibling
    After(String),
}

impl Placement {
    pub fn from_predecessor(predecessor: Option<&str>) -> Self {
        match predecessor {
            Some(id) => Placement::After(id.to_string()),
            None => Placement::Unanchored,
        }
    }

    pub fn predecessor(&self) -> Option<&str> {
        match self {
            Placement::Unanchored => None,
            Placement::After(id) => Some(id),
        }
    }
}

/// Partial update for a section's own fields (rules travel separately).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_to: Option<Vec<ScopeTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl SectionPatch {
    /// A patch that only moves the section.
    pub fn reposition(placement: Placement) -> Self {
        Self {
            placement: Some(placement),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.description.is_none()
            && self.stateful.is_none()
            && self.tags.is_none()
            && self.applied_to.is_none()
            && self.placement.is_none()
    }
}
