//! Per-section lifecycle
//!
//! ```text
//! Planned -> Creating -> Active -> Deleting -> Gone
//!                         |  ^
//!                         v  |
//!                       Updating
//! ```
//!
//! A failed step returns the section to the state it started from; only a
//! successful remote call moves it forward.

use std::fmt;

use policy_model::Section;

use crate::{Error, Result};

/// Where a tracked section is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionState {
    /// Desired object only, no remote id
    Planned,
    Creating,
    /// Exists remotely and was synced by the last successful call
    Active,
    Updating,
    Deleting,
    /// Deleted; terminal
    Gone,
}

impl SectionState {
    pub fn can_transition_to(self, next: SectionState) -> bool {
        use SectionState::*;
        matches!(
            (self, next),
            (Planned, Creating)
                | (Creating, Active)
                | (Active, Updating)
                | (Updating, Active)
                | (Active, Deleting)
                | (Deleting, Gone)
        )
    }

    /// Whether the state only exists while a call is in flight.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            SectionState::Creating | SectionState::Updating | SectionState::Deleting
        )
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionState::Planned => "planned",
            SectionState::Creating => "creating",
            SectionState::Active => "active",
            SectionState::Updating => "updating",
            SectionState::Deleting => "deleting",
            SectionState::Gone => "gone",
        };
        f.write_str(name)
    }
}

/// A desired section paired with what the controller last confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedSection {
    state: SectionState,
    desired: Section,
    synced: Option<Section>,
}

impl TrackedSection {
    /// A section to be created.
    pub fn planned(desired: Section) -> Self {
        Self {
            state: SectionState::Planned,
            desired,
            synced: None,
        }
    }

    /// A section that already exists remotely, desired as it is.
    pub fn active(synced: Section) -> Self {
        Self {
            state: SectionState::Active,
            desired: synced.clone(),
            synced: Some(synced),
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn desired(&self) -> &Section {
        &self.desired
    }

    /// Edit the desired object; takes effect on the next update.
    pub fn desired_mut(&mut self) -> &mut Section {
        &mut self.desired
    }

    pub fn set_desired(&mut self, desired: Section) {
        self.desired = desired;
    }

    /// The object as last returned by the controller.
    pub fn synced(&self) -> Option<&Section> {
        self.synced.as_ref()
    }

    /// Remote id, once created.
    pub fn id(&self) -> Option<&str> {
        self.synced.as_ref().and_then(|s| s.id())
    }

    pub fn label(&self) -> String {
        match &self.synced {
            Some(synced) => synced.label(),
            None => self.desired.label(),
        }
    }

    /// Enter `next`, returning the state to roll back to.
    pub(crate) fn begin(&mut self, next: SectionState) -> Result<SectionState> {
        self.check(next)?;
        let prior = self.state;
        self.state = next;
        Ok(prior)
    }

    pub(crate) fn check(&self, next: SectionState) -> Result<()> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                section: self.label(),
                from: self.state,
                to: next,
            })
        }
    }

    /// Record a confirmed remote object and move to `Active`. The desired
    /// object adopts it, so ids assigned by the controller carry forward.
    pub(crate) fn settle(&mut self, synced: Section) {
        self.state = SectionState::Active;
        self.desired = synced.clone();
        self.synced = Some(synced);
    }

    /// Refresh the confirmed object without touching desired state.
    pub(crate) fn observe(&mut self, synced: Section) {
        self.synced = Some(synced);
    }

    pub(crate) fn finish_delete(&mut self) {
        self.state = SectionState::Gone;
    }

    pub(crate) fn rollback(&mut self, prior: SectionState) {
        self.state = prior;
    }
}
