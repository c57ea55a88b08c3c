//! PolicyReconciler: create, read, update and delete a section with its rules
//! as one logical unit.
//!
//! Every operation runs the local checks first (field validation, immutable
//! fields, predecessor existence, cycles) and only then issues mutations, so
//! a rejected desired state never reaches the controller. Reads may happen
//! before the checks: cycle detection needs the observed sibling set.
//!
//! The observed order comes from the listing itself. The controller may drop
//! `predecessor_ref` from its responses, so the reconciler records every
//! placement it asks for and reads the listing through that record.

use policy_client::{ClientContext, ClientContextRouter, ParentPath, TenantMode};
use policy_model::{Placement, Rule, Section, SectionPatch};

use crate::config::ReconcilerConfig;
use crate::diff::{RuleChanges, RulePlan, diff_section, plan_rules};
use crate::lifecycle::{SectionState, TrackedSection};
use crate::ordering::{AnchorBook, BatchMember, DeletePlan, OrderingEngine, Repoint};
use crate::{Error, Result};

/// Drives tracked sections of one domain towards their desired state.
///
/// Calls are sequential and blocking. The reconciler holds no lock: callers
/// that reconcile sections sharing predecessor references concurrently must
/// serialize per domain themselves.
pub struct PolicyReconciler {
    sections: ClientContextRouter<Section>,
    rules: ClientContextRouter<Rule>,
    config: ReconcilerConfig,
    anchors: AnchorBook,
}

impl PolicyReconciler {
    /// Bind routers for sections and rules to the context's surface.
    ///
    /// # Errors
    ///
    /// Fails if the context's tenant mode cannot be served by its connector.
    pub fn new(context: &ClientContext, config: ReconcilerConfig) -> Result<Self> {
        let sections = ClientContextRouter::new(context, &config.routing)?;
        let rules = ClientContextRouter::new(context, &config.routing)?;

        Ok(Self {
            sections,
            rules,
            config,
            anchors: AnchorBook::new(),
        })
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn tenant_mode(&self) -> TenantMode {
        self.sections.tenant_mode()
    }

    /// Every section of the domain, in controller order.
    pub fn list(&self) -> Result<Vec<Section>> {
        Ok(self.sections.list_all(&self.domain())?)
    }

    /// Start tracking a section that already exists remotely.
    pub fn import(&self, section_id: &str) -> Result<TrackedSection> {
        let remote = self.sections.get(&self.domain(), section_id)?;
        tracing::info!(
            domain_id = %self.config.domain_id,
            section_id,
            rules = remote.rules.len(),
            "Imported section"
        );
        Ok(TrackedSection::active(remote))
    }

    /// Refresh the synced copy of an active section. A section deleted
    /// behind our back surfaces as not-found.
    pub fn read(&self, tracked: &mut TrackedSection) -> Result<Section> {
        self.require_active(tracked)?;
        let id = remote_id(tracked)?;
        let mut remote = self.sections.get(&self.domain(), &id)?;
        self.annotate(&mut remote);
        tracked.observe(remote.clone());
        Ok(remote)
    }

    /// Create a planned section. The controller's response becomes the
    /// synced state.
    pub fn create(&self, tracked: &mut TrackedSection) -> Result<Section> {
        tracked.check(SectionState::Creating)?;
        let desired = tracked.desired();
        desired.validate()?;

        let domain = self.domain();
        if desired.predecessor_ref.is_some() {
            let siblings = self.sections.list_all(&domain)?;
            self.observe(&siblings).plan_create(desired)?;
        }
        let payload = creation_payload(desired);

        let prior = tracked.begin(SectionState::Creating)?;
        match self.sections.create(&domain, &payload) {
            Ok(mut created) => {
                if let Some(id) = created.id() {
                    self.anchors.record(id, payload.predecessor_ref.as_deref());
                }
                self.annotate(&mut created);
                tracing::info!(
                    domain_id = %self.config.domain_id,
                    section = %created.label(),
                    predecessor = ?created.predecessor_ref,
                    "Created section"
                );
                tracked.settle(created.clone());
                Ok(created)
            }
            Err(err) => {
                tracked.rollback(prior);
                Err(err.into())
            }
        }
    }

    /// Bring an active section to its desired state.
    ///
    /// Issues no mutation when nothing differs. A rule reorder goes out as
    /// one full-replace update of the section; otherwise the section fields
    /// (and placement) are patched and rules are changed one by one.
    pub fn update(&self, tracked: &mut TrackedSection) -> Result<Section> {
        tracked.check(SectionState::Updating)?;
        let id = remote_id(tracked)?;
        let desired = tracked.desired().clone();
        desired.validate()?;

        let domain = self.domain();
        let remote = self.sections.get(&domain, &id)?;

        if desired.section_type != remote.section_type {
            return Err(Error::ImmutableField {
                section: tracked.label(),
                field: "section_type",
            });
        }

        // Compared against the observed order, not the echoed reference
        let placement = match desired.predecessor_ref.as_deref() {
            Some(predecessor) => {
                let siblings = self.sections.list_all(&domain)?;
                self.observe(&siblings).plan_reposition(&id, Some(predecessor))?
            }
            None => None,
        };

        let mut patch = diff_section(&desired, &remote);
        patch.placement = placement;
        let rule_plan = plan_rules(&desired.rules, &remote.rules);

        if patch.is_empty() && rule_plan.is_unchanged() {
            tracing::debug!(section = %remote.label(), "Section already in sync");
            if let Some(predecessor) = desired.predecessor_ref.as_deref() {
                self.anchors.record(&id, Some(predecessor));
            }
            let mut remote = remote;
            self.annotate(&mut remote);
            tracked.settle(remote.clone());
            return Ok(remote);
        }

        let prior = tracked.begin(SectionState::Updating)?;
        match self.push_update(&domain, &id, &remote, patch, rule_plan) {
            Ok(mut synced) => {
                if let Some(predecessor) = desired.predecessor_ref.as_deref() {
                    self.anchors.record(&id, Some(predecessor));
                }
                self.annotate(&mut synced);
                tracing::info!(
                    domain_id = %self.config.domain_id,
                    section = %synced.label(),
                    "Updated section"
                );
                tracked.settle(synced.clone());
                Ok(synced)
            }
            Err(err) => {
                tracing::warn!(
                    section = %tracked.label(),
                    error = %err,
                    "Update failed, keeping last synced state"
                );
                tracked.rollback(prior);
                Err(err)
            }
        }
    }

    /// Delete an active section, splicing its successors onto its own
    /// predecessor. An already-absent section counts as deleted.
    ///
    /// If the delete call fails, successors already re-pointed are put back
    /// behind the section. Once the section is gone the call succeeds, even
    /// if checking or repairing its successors afterwards fails.
    pub fn delete(&self, tracked: &mut TrackedSection) -> Result<()> {
        tracked.check(SectionState::Deleting)?;
        let id = remote_id(tracked)?;

        let domain = self.domain();
        let siblings = self.sections.list_all(&domain)?;
        let engine = self.observe(&siblings);
        let plan = engine.plan_delete(&id)?;

        let prior = tracked.begin(SectionState::Deleting)?;
        if let Err(err) = self.splice_and_delete(&domain, &plan) {
            tracked.rollback(prior);
            return Err(err);
        }
        tracked.finish_delete();
        self.anchors.splice(&id, engine.graph().predecessor(&id));

        tracing::info!(
            domain_id = %self.config.domain_id,
            section_id = %id,
            remaining = plan.remaining_order.len(),
            "Deleted section"
        );

        // A failed check does not undo the delete
        if self.config.verify_after_delete
            && !plan.repoints.is_empty()
            && let Err(err) = self.verify_splice(&domain, &plan)
        {
            tracing::warn!(
                section_id = %id,
                error = %err,
                "Deleted section, but could not verify its successors"
            );
        }
        Ok(())
    }

    /// Reconcile several sections together.
    ///
    /// All members are validated and the combined predecessor graph (observed
    /// references overlaid with every desired one) is checked for cycles
    /// before the first mutation. Members are then processed one at a time,
    /// predecessors first: planned ones are created, active ones updated,
    /// gone ones skipped. Stops at the first failure; members already
    /// processed keep their new state.
    pub fn apply(&self, batch: &mut [TrackedSection]) -> Result<()> {
        for tracked in batch.iter() {
            match tracked.state() {
                SectionState::Gone => continue,
                SectionState::Planned | SectionState::Active => {}
                other => {
                    return Err(Error::InvalidTransition {
                        section: tracked.label(),
                        from: other,
                        to: SectionState::Active,
                    });
                }
            }
            tracked.desired().validate()?;
        }

        let siblings = self.sections.list_all(&self.domain())?;
        let engine = self.observe(&siblings);

        let live: Vec<usize> = (0..batch.len())
            .filter(|&idx| batch[idx].state() != SectionState::Gone)
            .collect();
        let members: Vec<BatchMember<'_>> = live
            .iter()
            .map(|&idx| BatchMember {
                id: batch[idx].id(),
                predecessor: batch[idx].desired().predecessor_ref.as_deref(),
                name: &batch[idx].desired().display_name,
            })
            .collect();
        let order: Vec<usize> = engine
            .check_batch(&members)?
            .into_iter()
            .map(|pos| live[pos])
            .collect();

        tracing::info!(
            domain_id = %self.config.domain_id,
            sections = order.len(),
            "Applying section batch"
        );

        for idx in order {
            let tracked = &mut batch[idx];
            if tracked.state() == SectionState::Planned {
                self.create(tracked)?;
            } else {
                self.update(tracked)?;
            }
        }

        Ok(())
    }

    fn push_update(
        &self,
        domain: &ParentPath,
        id: &str,
        remote: &Section,
        patch: SectionPatch,
        rule_plan: RulePlan,
    ) -> Result<Section> {
        match rule_plan {
            RulePlan::ReplaceAll(rules) => {
                let mut full = remote.clone();
                full.apply_patch(&patch);
                full.rules = rules;
                Ok(self.sections.update(domain, id, &full)?)
            }
            RulePlan::Incremental(changes) => {
                if !patch.is_empty() {
                    self.sections.patch(domain, id, &patch)?;
                }
                self.apply_rule_changes(id, &changes)?;
                Ok(self.sections.get(domain, id)?)
            }
            RulePlan::Unchanged => {
                self.sections.patch(domain, id, &patch)?;
                Ok(self.sections.get(domain, id)?)
            }
        }
    }

    fn apply_rule_changes(&self, section_id: &str, changes: &RuleChanges) -> Result<()> {
        let parent = ParentPath::section(&self.config.domain_id, section_id);

        for rule_id in &changes.deletes {
            match self.rules.delete(&parent, rule_id) {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {
                    tracing::debug!(%parent, rule_id = %rule_id, "Rule already absent");
                }
                Err(err) => return Err(err.into()),
            }
        }
        for (rule_id, patch) in &changes.patches {
            self.rules.patch(&parent, rule_id, patch)?;
        }
        for rule in &changes.creates {
            self.rules.create(&parent, rule)?;
        }

        Ok(())
    }

    fn splice_and_delete(&self, domain: &ParentPath, plan: &DeletePlan) -> Result<()> {
        let mut repointed: Vec<&Repoint> = Vec::new();

        if self.config.splice_before_delete {
            for repoint in &plan.repoints {
                tracing::info!(
                    section_id = %repoint.section_id,
                    deleted = %plan.section_id,
                    predecessor = ?repoint.placement.predecessor(),
                    "Re-pointing successor before delete"
                );
                let patch = SectionPatch::reposition(repoint.placement.clone());
                if let Err(err) = self.sections.patch(domain, &repoint.section_id, &patch) {
                    self.restore_successors(domain, plan, &repointed);
                    return Err(err.into());
                }
                repointed.push(repoint);
            }
        }

        match self.sections.delete(domain, &plan.section_id) {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                tracing::debug!(section_id = %plan.section_id, "Section already absent");
                Ok(())
            }
            Err(err) => {
                self.restore_successors(domain, plan, &repointed);
                Err(err.into())
            }
        }
    }

    /// Put successors re-pointed for a delete that failed back behind the
    /// section, which still exists. Best effort.
    fn restore_successors(&self, domain: &ParentPath, plan: &DeletePlan, repointed: &[&Repoint]) {
        let restore = SectionPatch::reposition(Placement::After(plan.section_id.clone()));

        for repoint in repointed {
            match self.sections.patch(domain, &repoint.section_id, &restore) {
                Ok(()) => tracing::info!(
                    section_id = %repoint.section_id,
                    predecessor = %plan.section_id,
                    "Restored successor after failed delete"
                ),
                Err(err) => tracing::warn!(
                    section_id = %repoint.section_id,
                    predecessor = %plan.section_id,
                    error = %err,
                    "Could not restore successor after failed delete"
                ),
            }
        }
    }

    /// Re-point successors the controller left behind on the deleted section.
    ///
    /// A successor whose listing omits `predecessor_ref` is checked by its
    /// position: it must follow its new predecessor directly.
    fn verify_splice(&self, domain: &ParentPath, plan: &DeletePlan) -> Result<()> {
        let siblings = self.sections.list_all(domain)?;

        for repoint in &plan.repoints {
            let Some(idx) = siblings
                .iter()
                .position(|s| s.id() == Some(repoint.section_id.as_str()))
            else {
                continue;
            };
            let expected = repoint.placement.predecessor();
            let found = match siblings[idx].predecessor_ref.as_deref() {
                Some(echoed) => Some(echoed),
                None if expected.is_none() => None,
                None => idx.checked_sub(1).and_then(|prev| siblings[prev].id()),
            };

            if found != expected {
                tracing::warn!(
                    section_id = %repoint.section_id,
                    found = ?found,
                    expected = ?expected,
                    "Successor not spliced after delete, repairing"
                );
                self.sections.patch(
                    domain,
                    &repoint.section_id,
                    &SectionPatch::reposition(repoint.placement.clone()),
                )?;
            }
        }

        Ok(())
    }

    /// Ordering engine over a listing, read through the recorded placements.
    fn observe(&self, siblings: &[Section]) -> OrderingEngine {
        OrderingEngine::observe_with(siblings, &self.anchors.snapshot())
    }

    /// Fill in the placement recorded for a section returned without one.
    fn annotate(&self, section: &mut Section) {
        if section.predecessor_ref.is_none()
            && let Some(id) = section.id()
            && let Some(Some(anchor)) = self.anchors.anchor(id)
        {
            section.predecessor_ref = Some(anchor);
        }
    }

    fn require_active(&self, tracked: &TrackedSection) -> Result<()> {
        if tracked.state() == SectionState::Active {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                section: tracked.label(),
                from: tracked.state(),
                to: SectionState::Active,
            })
        }
    }

    fn domain(&self) -> ParentPath {
        ParentPath::domain(&self.config.domain_id)
    }
}

fn remote_id(tracked: &TrackedSection) -> Result<String> {
    tracked.id().map(str::to_string).ok_or_else(|| {
        policy_model::Error::validation(tracked.label(), "id", "is missing on a tracked section")
            .into()
    })
}

/// Desired section stripped of everything the controller assigns.
fn creation_payload(desired: &Section) -> Section {
    let mut payload = desired.clone();
    payload.id = None;
    payload.revision = None;
    for rule in &mut payload.rules {
        rule.id = None;
    }
    payload
}
