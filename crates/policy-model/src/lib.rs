//! Policy object model for the firewall policy reconciler.
//!
//! This crate holds the desired/remote state types shared by every layer:
//!
//! - [`Section`]: an ordered container of [`Rule`]s, itself ordered among
//!   siblings through `predecessor_ref`
//! - [`Tag`] and [`tags_equal`]: unordered labels compared with set semantics
//! - [`ScopeTarget`] and [`scope_lists_equal`]: ordered references to groups
//!   and services
//! - [`SectionPatch`], [`RulePatch`], [`Placement`]: partial-update payloads
//!
//! Parsing and field validation errors surface as [`Error`].

pub mod error;
pub mod kinds;
pub mod rule;
pub mod scope;
pub mod section;
pub mod tag;
pub mod validation;

pub use error::{Error, Result};
pub use kinds::{Direction, IpProtocol, RuleAction, SectionType, TargetType};
pub use rule::{Rule, RulePatch};
pub use scope::{ScopeTarget, scope_lists_equal};
pub use section::{Placement, Section, SectionPatch};
pub use tag::{Tag, normalize_tags, tags_equal};
