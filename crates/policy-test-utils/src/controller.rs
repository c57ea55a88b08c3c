//! [`MemoryController`]: an in-memory policy controller for tests.
//!
//! Behaves like the real controller where the reconciler depends on it:
//!
//! - ids are assigned on create (`section-N`, `rule-N`, counted per tenant
//!   and domain so equivalent data gets equivalent ids on both surfaces)
//! - sections are listed in chain order: each section follows its
//!   `predecessor_ref`; sections without one start a chain, in creation order;
//!   several sections naming the same predecessor follow it in creation order
//! - tags come back sorted, whatever order they were sent in
//! - `update` checks `_revision` and rejects stale payloads with a conflict
//! - deleting a section that others reference is rejected, spliced or left
//!   dangling, depending on [`ReferencedDelete`]
//! - with `echo_predecessor` off, responses omit `predecessor_ref` and a full
//!   update without one keeps the stored placement
//!
//! Every call is recorded in a journal, and faults can be queued per object
//! kind and operation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use policy_client::{
    Connector, ListQuery, LocalTransport, MultitenantTransport, Page, ParentPath, TransportError,
    TransportResult,
};
use policy_model::{Rule, RulePatch, Section, SectionPatch, normalize_tags};

const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Which API surface (and tenant) a call addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tenancy {
    Local,
    Project { org_id: String, project_id: String },
}

impl Tenancy {
    pub fn project(org_id: &str, project_id: &str) -> Self {
        Tenancy::Project {
            org_id: org_id.to_string(),
            project_id: project_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    List,
    Create,
    Patch,
    Update,
    Delete,
}

impl Operation {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::Patch | Operation::Update | Operation::Delete
        )
    }
}

/// One call received by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub tenancy: Tenancy,
    /// `"section"` or `"rule"`
    pub kind: &'static str,
    pub operation: Operation,
    pub parent: ParentPath,
    pub object_id: Option<String>,
}

/// What deleting a section does to siblings naming it as predecessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferencedDelete {
    /// Refuse the delete with a conflict
    #[default]
    Reject,
    /// Re-point the siblings to the deleted section's predecessor
    Splice,
    /// Delete anyway; siblings keep the stale reference and float to the top
    Leave,
}

/// Controller behavior switches.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Serve the single-tenant surface
    pub local_surface: bool,
    /// Serve the organization/project surface
    pub multitenant_surface: bool,
    pub referenced_delete: ReferencedDelete,
    /// Return `predecessor_ref` in section responses
    pub echo_predecessor: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            local_surface: true,
            multitenant_surface: true,
            referenced_delete: ReferencedDelete::default(),
            echo_predecessor: true,
        }
    }
}

struct Fault {
    kind: &'static str,
    operation: Operation,
    error: TransportError,
}

#[derive(Default)]
struct DomainStore {
    /// Sections in creation order
    sections: Vec<Section>,
    next_section: u64,
    next_rule: u64,
}

impl DomainStore {
    fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id() == Some(id))
    }

    fn section(&self, id: &str) -> TransportResult<&Section> {
        self.position(id)
            .map(|idx| &self.sections[idx])
            .ok_or(TransportError::NotFound)
    }

    fn section_mut(&mut self, id: &str) -> TransportResult<&mut Section> {
        let idx = self.position(id).ok_or(TransportError::NotFound)?;
        Ok(&mut self.sections[idx])
    }

    fn next_section_id(&mut self) -> String {
        self.next_section += 1;
        format!("section-{}", self.next_section)
    }

    fn next_rule_id(&mut self) -> String {
        self.next_rule += 1;
        format!("rule-{}", self.next_rule)
    }

    /// Reject a predecessor that is missing, is the section itself, or sits
    /// downstream of it.
    fn check_predecessor(&self, id: Option<&str>, predecessor: &str) -> TransportResult<()> {
        if self.position(predecessor).is_none() {
            return Err(bad_request(format!(
                "predecessor section {} does not exist",
                predecessor
            )));
        }

        let Some(id) = id else {
            return Ok(());
        };

        let mut current = Some(predecessor.to_string());
        let mut steps = 0;
        while let Some(cursor) = current {
            if cursor == id || steps > self.sections.len() {
                return Err(bad_request(format!(
                    "placing {} after {} creates an ordering cycle",
                    id, predecessor
                )));
            }
            current = self
                .section(&cursor)
                .ok()
                .and_then(|s| s.predecessor_ref.clone());
            steps += 1;
        }
        Ok(())
    }

    /// Sections in chain order.
    fn ordered(&self) -> Vec<Section> {
        let ids: HashSet<&str> = self.sections.iter().filter_map(|s| s.id()).collect();
        let mut roots = Vec::new();
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();

        for (idx, section) in self.sections.iter().enumerate() {
            match section.predecessor_ref.as_deref() {
                Some(pred) if ids.contains(pred) => children.entry(pred).or_default().push(idx),
                _ => roots.push(idx),
            }
        }

        let mut ordered = Vec::with_capacity(self.sections.len());
        let mut visited = HashSet::new();
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            let section = &self.sections[idx];
            ordered.push(section.clone());
            if let Some(kids) = section.id().and_then(|id| children.get(id)) {
                stack.extend(kids.iter().rev());
            }
        }

        ordered
    }
}

#[derive(Default)]
struct State {
    domains: HashMap<(Tenancy, String), DomainStore>,
    calls: Vec<RecordedCall>,
    faults: VecDeque<Fault>,
}

impl State {
    fn store(&mut self, tenancy: &Tenancy, domain_id: &str) -> &mut DomainStore {
        self.domains
            .entry((tenancy.clone(), domain_id.to_string()))
            .or_default()
    }
}

struct Inner {
    state: Mutex<State>,
    options: ControllerOptions,
}

/// Fake controller serving both API surfaces from one in-memory store.
///
/// Cloning is cheap and shares the store, so a test can keep a handle for
/// assertions while the reconciler owns the connector.
#[derive(Clone)]
pub struct MemoryController {
    inner: Arc<Inner>,
}

impl Default for MemoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryController {
    pub fn new() -> Self {
        Self::with_options(ControllerOptions::default())
    }

    pub fn with_options(options: ControllerOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                options,
            }),
        }
    }

    /// This controller as a connector for a `ClientContext`.
    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Calls that create, patch, update or delete.
    pub fn mutations(&self) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make the next matching call fail with `error`.
    pub fn fail_next(&self, kind: &'static str, operation: Operation, error: TransportError) {
        self.lock().faults.push_back(Fault {
            kind,
            operation,
            error,
        });
    }

    /// Snapshot of a domain's sections in chain order. Not journaled.
    pub fn sections(&self, tenancy: &Tenancy, domain_id: &str) -> Vec<Section> {
        self.lock().store(tenancy, domain_id).ordered()
    }

    /// Display names of a domain's sections in chain order. Not journaled.
    pub fn section_order(&self, tenancy: &Tenancy, domain_id: &str) -> Vec<String> {
        self.sections(tenancy, domain_id)
            .into_iter()
            .map(|s| s.display_name)
            .collect()
    }

    /// Store a section directly, bypassing the journal.
    pub fn seed_section(
        &self,
        tenancy: &Tenancy,
        domain_id: &str,
        section: &Section,
    ) -> TransportResult<Section> {
        let mut state = self.lock();
        create_section(state.store(tenancy, domain_id), section)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Journal the call and pop a matching fault, if any.
    fn begin(
        &self,
        tenancy: &Tenancy,
        kind: &'static str,
        operation: Operation,
        parent: &ParentPath,
        object_id: Option<&str>,
    ) -> TransportResult<MutexGuard<'_, State>> {
        tracing::trace!(?tenancy, kind, ?operation, %parent, ?object_id, "Controller call");
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            tenancy: tenancy.clone(),
            kind,
            operation,
            parent: parent.clone(),
            object_id: object_id.map(str::to_string),
        });

        if let Some(idx) = state
            .faults
            .iter()
            .position(|f| f.kind == kind && f.operation == operation)
            && let Some(fault) = state.faults.remove(idx)
        {
            return Err(fault.error);
        }

        Ok(state)
    }

    // ---------------------------------------------------------------------
    // Sections
    // ---------------------------------------------------------------------

    /// A stored section as the controller returns it.
    fn respond(&self, mut section: Section) -> Section {
        if !self.inner.options.echo_predecessor {
            section.predecessor_ref = None;
        }
        section
    }

    fn section_get(&self, t: &Tenancy, parent: &ParentPath, id: &str) -> TransportResult<Section> {
        let mut state = self.begin(t, "section", Operation::Get, parent, Some(id))?;
        let section = state.store(t, &parent.domain_id).section(id)?.clone();
        Ok(self.respond(section))
    }

    fn section_list(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        query: &ListQuery,
    ) -> TransportResult<Page<Section>> {
        let mut state = self.begin(t, "section", Operation::List, parent, None)?;
        let ordered = state.store(t, &parent.domain_id).ordered();
        let mut page = paginate(&ordered, query)?;
        page.results = page.results.into_iter().map(|s| self.respond(s)).collect();
        Ok(page)
    }

    fn section_create(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        section: &Section,
    ) -> TransportResult<Section> {
        let mut state = self.begin(t, "section", Operation::Create, parent, None)?;
        let created = create_section(state.store(t, &parent.domain_id), section)?;
        Ok(self.respond(created))
    }

    fn section_patch(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        id: &str,
        patch: &SectionPatch,
    ) -> TransportResult<()> {
        let mut state = self.begin(t, "section", Operation::Patch, parent, Some(id))?;
        let store = state.store(t, &parent.domain_id);
        store.section(id)?;

        if let Some(predecessor) = patch.placement.as_ref().and_then(|p| p.predecessor()) {
            store.check_predecessor(Some(id), predecessor)?;
        }

        let section = store.section_mut(id)?;
        section.apply_patch(patch);
        section.tags = normalize_tags(&section.tags);
        bump_revision(section);
        Ok(())
    }

    fn section_update(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        id: &str,
        object: &Section,
    ) -> TransportResult<Section> {
        let mut state = self.begin(t, "section", Operation::Update, parent, Some(id))?;
        let store = state.store(t, &parent.domain_id);
        let current = store.section(id)?.clone();

        if object.revision != current.revision {
            return Err(TransportError::Conflict {
                message: format!(
                    "section {} is at revision {:?}, payload carries {:?}",
                    id, current.revision, object.revision
                ),
            });
        }
        if object.section_type != current.section_type {
            return Err(bad_request("section_type cannot be changed"));
        }
        if object.predecessor_ref != current.predecessor_ref
            && let Some(predecessor) = object.predecessor_ref.as_deref()
        {
            store.check_predecessor(Some(id), predecessor)?;
        }

        let known: HashSet<&str> = current.rules.iter().filter_map(|r| r.id()).collect();
        if let Some(unknown) = object
            .rules
            .iter()
            .filter_map(|r| r.id())
            .find(|rid| !known.contains(rid))
        {
            return Err(bad_request(format!("rule {} does not belong to {}", unknown, id)));
        }

        let mut stored = object.clone();
        if !self.inner.options.echo_predecessor && stored.predecessor_ref.is_none() {
            stored.predecessor_ref = current.predecessor_ref.clone();
        }
        stored.id = current.id.clone();
        stored.revision = current.revision;
        stored.tags = normalize_tags(&object.tags);
        for rule in &mut stored.rules {
            if rule.id.is_none() {
                rule.id = Some(store.next_rule_id());
            }
        }
        bump_revision(&mut stored);

        *store.section_mut(id)? = stored.clone();
        Ok(self.respond(stored))
    }

    fn section_delete(&self, t: &Tenancy, parent: &ParentPath, id: &str) -> TransportResult<()> {
        let referenced_delete = self.inner.options.referenced_delete;
        let mut state = self.begin(t, "section", Operation::Delete, parent, Some(id))?;
        let store = state.store(t, &parent.domain_id);
        let idx = store.position(id).ok_or(TransportError::NotFound)?;
        let spliced_predecessor = store.sections[idx].predecessor_ref.clone();

        let referencing: Vec<usize> = store
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.predecessor_ref.as_deref() == Some(id))
            .map(|(i, _)| i)
            .collect();

        match referenced_delete {
            ReferencedDelete::Reject if !referencing.is_empty() => {
                return Err(TransportError::Conflict {
                    message: format!(
                        "section {} is referenced as predecessor by {} section(s)",
                        id,
                        referencing.len()
                    ),
                });
            }
            ReferencedDelete::Splice => {
                for i in referencing {
                    let sibling = &mut store.sections[i];
                    sibling.predecessor_ref = spliced_predecessor.clone();
                    bump_revision(sibling);
                }
            }
            _ => {}
        }

        store.sections.remove(idx);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Rules
    // ---------------------------------------------------------------------

    fn rule_get(&self, t: &Tenancy, parent: &ParentPath, id: &str) -> TransportResult<Rule> {
        let mut state = self.begin(t, "rule", Operation::Get, parent, Some(id))?;
        let section = state.store(t, &parent.domain_id).section(rule_section(parent)?)?;
        section
            .rules
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
            .ok_or(TransportError::NotFound)
    }

    fn rule_list(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        query: &ListQuery,
    ) -> TransportResult<Page<Rule>> {
        let mut state = self.begin(t, "rule", Operation::List, parent, None)?;
        let section = state.store(t, &parent.domain_id).section(rule_section(parent)?)?;
        paginate(&section.rules, query)
    }

    fn rule_create(&self, t: &Tenancy, parent: &ParentPath, rule: &Rule) -> TransportResult<Rule> {
        let mut state = self.begin(t, "rule", Operation::Create, parent, None)?;
        let store = state.store(t, &parent.domain_id);
        let section_id = rule_section(parent)?;
        store.section(section_id)?;

        let mut stored = rule.clone();
        stored.id = Some(store.next_rule_id());
        let section = store.section_mut(section_id)?;
        section.rules.push(stored.clone());
        bump_revision(section);
        Ok(stored)
    }

    fn rule_patch(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        id: &str,
        patch: &RulePatch,
    ) -> TransportResult<()> {
        let mut state = self.begin(t, "rule", Operation::Patch, parent, Some(id))?;
        let section = state
            .store(t, &parent.domain_id)
            .section_mut(rule_section(parent)?)?;
        let rule = section
            .rules
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or(TransportError::NotFound)?;
        rule.apply_patch(patch);
        bump_revision(section);
        Ok(())
    }

    fn rule_update(
        &self,
        t: &Tenancy,
        parent: &ParentPath,
        id: &str,
        object: &Rule,
    ) -> TransportResult<Rule> {
        let mut state = self.begin(t, "rule", Operation::Update, parent, Some(id))?;
        let section = state
            .store(t, &parent.domain_id)
            .section_mut(rule_section(parent)?)?;
        let rule = section
            .rules
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or(TransportError::NotFound)?;
        *rule = object.clone().with_id(id);
        let stored = rule.clone();
        bump_revision(section);
        Ok(stored)
    }

    fn rule_delete(&self, t: &Tenancy, parent: &ParentPath, id: &str) -> TransportResult<()> {
        let mut state = self.begin(t, "rule", Operation::Delete, parent, Some(id))?;
        let section = state
            .store(t, &parent.domain_id)
            .section_mut(rule_section(parent)?)?;
        let idx = section
            .rules
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or(TransportError::NotFound)?;
        section.rules.remove(idx);
        bump_revision(section);
        Ok(())
    }
}

fn create_section(store: &mut DomainStore, section: &Section) -> TransportResult<Section> {
    if let Some(predecessor) = section.predecessor_ref.as_deref() {
        store.check_predecessor(None, predecessor)?;
    }

    let mut stored = section.clone();
    stored.id = Some(store.next_section_id());
    stored.revision = Some(0);
    stored.tags = normalize_tags(&section.tags);
    for rule in &mut stored.rules {
        rule.id = Some(store.next_rule_id());
    }

    store.sections.push(stored.clone());
    Ok(stored)
}

fn bump_revision(section: &mut Section) {
    section.revision = Some(section.revision.map_or(0, |r| r + 1));
}

fn rule_section(parent: &ParentPath) -> TransportResult<&str> {
    parent
        .section_id
        .as_deref()
        .ok_or_else(|| bad_request("rule collection requires a section"))
}

fn bad_request(message: impl Into<String>) -> TransportError {
    TransportError::Status {
        code: 400,
        message: message.into(),
    }
}

fn paginate<T: Clone>(items: &[T], query: &ListQuery) -> TransportResult<Page<T>> {
    let offset = match &query.cursor {
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| bad_request(format!("invalid cursor {}", cursor)))?,
        None => 0,
    };
    let size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1) as usize;
    let end = offset.saturating_add(size).min(items.len());
    let results = items.get(offset..end).unwrap_or_default().to_vec();
    let cursor = (end < items.len()).then(|| end.to_string());

    Ok(Page {
        results,
        cursor,
        result_count: items.len() as u64,
    })
}

// -------------------------------------------------------------------------
// Transport bindings
// -------------------------------------------------------------------------

impl Connector for MemoryController {
    fn local_sections(&self) -> Option<Arc<dyn LocalTransport<Section>>> {
        if self.inner.options.local_surface {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }

    fn local_rules(&self) -> Option<Arc<dyn LocalTransport<Rule>>> {
        if self.inner.options.local_surface {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }

    fn multitenant_sections(&self) -> Option<Arc<dyn MultitenantTransport<Section>>> {
        if self.inner.options.multitenant_surface {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }

    fn multitenant_rules(&self) -> Option<Arc<dyn MultitenantTransport<Rule>>> {
        if self.inner.options.multitenant_surface {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }
}

impl LocalTransport<Section> for MemoryController {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<Section> {
        self.section_get(&Tenancy::Local, parent, id)
    }

    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<Section>> {
        self.section_list(&Tenancy::Local, parent, query)
    }

    fn create(&self, parent: &ParentPath, object: &Section) -> TransportResult<Section> {
        self.section_create(&Tenancy::Local, parent, object)
    }

    fn patch(&self, parent: &ParentPath, id: &str, patch: &SectionPatch) -> TransportResult<()> {
        self.section_patch(&Tenancy::Local, parent, id, patch)
    }

    fn update(&self, parent: &ParentPath, id: &str, object: &Section) -> TransportResult<Section> {
        self.section_update(&Tenancy::Local, parent, id, object)
    }

    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.section_delete(&Tenancy::Local, parent, id)
    }
}

impl MultitenantTransport<Section> for MemoryController {
    fn get(&self, org: &str, project: &str, parent: &ParentPath, id: &str) -> TransportResult<Section> {
        self.section_get(&Tenancy::project(org, project), parent, id)
    }

    fn list(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        query: &ListQuery,
    ) -> TransportResult<Page<Section>> {
        self.section_list(&Tenancy::project(org, project), parent, query)
    }

    fn create(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        object: &Section,
    ) -> TransportResult<Section> {
        self.section_create(&Tenancy::project(org, project), parent, object)
    }

    fn patch(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        id: &str,
        patch: &SectionPatch,
    ) -> TransportResult<()> {
        self.section_patch(&Tenancy::project(org, project), parent, id, patch)
    }

    fn update(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        id: &str,
        object: &Section,
    ) -> TransportResult<Section> {
        self.section_update(&Tenancy::project(org, project), parent, id, object)
    }

    fn delete(&self, org: &str, project: &str, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.section_delete(&Tenancy::project(org, project), parent, id)
    }
}

impl LocalTransport<Rule> for MemoryController {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<Rule> {
        self.rule_get(&Tenancy::Local, parent, id)
    }

    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<Rule>> {
        self.rule_list(&Tenancy::Local, parent, query)
    }

    fn create(&self, parent: &ParentPath, object: &Rule) -> TransportResult<Rule> {
        self.rule_create(&Tenancy::Local, parent, object)
    }

    fn patch(&self, parent: &ParentPath, id: &str, patch: &RulePatch) -> TransportResult<()> {
        self.rule_patch(&Tenancy::Local, parent, id, patch)
    }

    fn update(&self, parent: &ParentPath, id: &str, object: &Rule) -> TransportResult<Rule> {
        self.rule_update(&Tenancy::Local, parent, id, object)
    }

    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.rule_delete(&Tenancy::Local, parent, id)
    }
}

impl MultitenantTransport<Rule> for MemoryController {
    fn get(&self, org: &str, project: &str, parent: &ParentPath, id: &str) -> TransportResult<Rule> {
        self.rule_get(&Tenancy::project(org, project), parent, id)
    }

    fn list(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        query: &ListQuery,
    ) -> TransportResult<Page<Rule>> {
        self.rule_list(&Tenancy::project(org, project), parent, query)
    }

    fn create(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        object: &Rule,
    ) -> TransportResult<Rule> {
        self.rule_create(&Tenancy::project(org, project), parent, object)
    }

    fn patch(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        id: &str,
        patch: &RulePatch,
    ) -> TransportResult<()> {
        self.rule_patch(&Tenancy::project(org, project), parent, id, patch)
    }

    fn update(
        &self,
        org: &str,
        project: &str,
        parent: &ParentPath,
        id: &str,
        object: &Rule,
    ) -> TransportResult<Rule> {
        self.rule_update(&Tenancy::project(org, project), parent, id, object)
    }

    fn delete(&self, org: &str, project: &str, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.rule_delete(&Tenancy::project(org, project), parent, id)
    }
}
