//! Field constraints enforced before anything is sent to the controller

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::rule::Rule;
use crate::scope::ScopeTarget;
use crate::section::Section;
use crate::tag::Tag;

/// Maximum number of tags on a single object
pub const MAX_TAGS: usize = 30;

/// Maximum length of a tag scope
pub const MAX_TAG_SCOPE_LEN: usize = 128;

/// Maximum length of a tag value
pub const MAX_TAG_VALUE_LEN: usize = 256;

impl Section {
    /// Check every documented field constraint on this section and its rules.
    pub fn validate(&self) -> Result<()> {
        let object = format!("section '{}'", self.display_name);

        if self.display_name.trim().is_empty() {
            return Err(Error::validation(object, "display_name", "must not be empty"));
        }

        if let Some(predecessor) = &self.predecessor_ref {
            if predecessor.is_empty() {
                return Err(Error::validation(
                    object,
                    "predecessor_ref",
                    "must not be empty",
                ));
            }
            if self.id.as_deref() == Some(predecessor.as_str()) {
                return Err(Error::validation(
                    object,
                    "predecessor_ref",
                    "must not reference the section itself",
                ));
            }
        }

        validate_tags(&object, &self.tags)?;
        validate_targets(&object, "applied_to", &self.applied_to)?;

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if let Some(id) = rule.id()
                && !rule_ids.insert(id)
            {
                return Err(Error::validation(
                    object,
                    "rule",
                    format!("contains duplicate rule id {}", id),
                ));
            }
            rule.validate()?;
        }

        Ok(())
    }
}

impl Rule {
    pub fn validate(&self) -> Result<()> {
        let object = format!("rule '{}'", self.display_name);
        validate_targets(&object, "sources", &self.sources)?;
        validate_targets(&object, "destinations", &self.destinations)?;
        validate_targets(&object, "services", &self.services)?;
        validate_targets(&object, "applied_to", &self.applied_to)?;
        Ok(())
    }
}

fn validate_tags(object: &str, tags: &[Tag]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(Error::validation(
            object,
            "tag",
            format!("has {} entries (max {})", tags.len(), MAX_TAGS),
        ));
    }

    for tag in tags {
        if tag.value.is_empty() {
            return Err(Error::validation(object, "tag", "value must not be empty"));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(Error::validation(
                object,
                "tag",
                format!("value exceeds {} characters", MAX_TAG_VALUE_LEN),
            ));
        }
        if let Some(scope) = &tag.scope
            && scope.chars().count() > MAX_TAG_SCOPE_LEN
        {
            return Err(Error::validation(
                object,
                "tag",
                format!("scope exceeds {} characters", MAX_TAG_SCOPE_LEN),
            ));
        }
    }

    Ok(())
}

fn validate_targets(object: &str, field: &str, targets: &[ScopeTarget]) -> Result<()> {
    if targets.iter().any(|t| t.target_id.trim().is_empty()) {
        return Err(Error::validation(
            object,
            field,
            "contains a target with an empty target_id",
        ));
    }
    Ok(())
}
