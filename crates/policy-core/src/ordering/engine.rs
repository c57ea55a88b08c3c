//! Planning of create, reposition and delete against an observed sibling set

use std::collections::HashMap;

use policy_model::{Placement, Section};

use super::graph::PredecessorGraph;
use crate::{Error, Result};

/// A sibling whose predecessor must change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repoint {
    pub section_id: String,
    pub placement: Placement,
}

/// What deleting a section does to the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub section_id: String,
    /// Siblings that named the deleted section as predecessor, re-pointed to
    /// its own predecessor
    pub repoints: Vec<Repoint>,
    /// Expected order once the section is gone
    pub remaining_order: Vec<String>,
}

/// One member of a multi-section apply, as seen by [`OrderingEngine::check_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchMember<'a> {
    /// Remote id; `None` for a section not created yet
    pub id: Option<&'a str>,
    /// Desired predecessor; `None` keeps the current one (or the tail, on create)
    pub predecessor: Option<&'a str>,
    /// Display name, for error messages
    pub name: &'a str,
}

/// Resolves desired predecessor references against one observed sibling set.
///
/// Built fresh for every reconciliation pass from a listing of the domain.
#[derive(Debug, Clone)]
pub struct OrderingEngine {
    graph: PredecessorGraph,
}

impl OrderingEngine {
    /// Observe siblings in controller order, with no recorded placements.
    pub fn observe(siblings: &[Section]) -> Self {
        Self::observe_with(siblings, &HashMap::new())
    }

    /// Observe siblings in controller order, falling back on `anchors` for
    /// sections whose listing carries no usable `predecessor_ref`.
    pub fn observe_with(siblings: &[Section], anchors: &HashMap<String, Option<String>>) -> Self {
        Self {
            graph: PredecessorGraph::from_listing(siblings, anchors),
        }
    }

    pub fn from_graph(graph: PredecessorGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &PredecessorGraph {
        &self.graph
    }

    /// Current order of the observed siblings.
    pub fn order(&self) -> Result<Vec<String>> {
        self.graph.linearize()
    }

    /// Resolve the predecessor to send with a create.
    ///
    /// A new section has no successors yet, so it cannot close a cycle; the
    /// only check is that the predecessor exists.
    pub fn plan_create(&self, desired: &Section) -> Result<Option<String>> {
        match desired.predecessor_ref.as_deref() {
            None => Ok(None),
            Some(predecessor) => {
                self.require(&desired.display_name, predecessor)?;
                Ok(Some(predecessor.to_string()))
            }
        }
    }

    /// Resolve a desired predecessor for an existing section into the
    /// placement to send, or `None` when nothing moves.
    pub fn plan_reposition(
        &self,
        section_id: &str,
        desired: Option<&str>,
    ) -> Result<Option<Placement>> {
        let Some(predecessor) = desired else {
            return Ok(None);
        };

        if predecessor == section_id {
            return Err(Error::OrderingCycle {
                chain: vec![section_id.to_string(), section_id.to_string()],
            });
        }
        if self.graph.predecessor(section_id) == Some(predecessor) {
            return Ok(None);
        }
        self.require(section_id, predecessor)?;

        self.graph
            .with_edge(section_id, Some(predecessor))
            .validate()?;

        tracing::debug!(section_id, predecessor, "Planned reposition");
        Ok(Some(Placement::After(predecessor.to_string())))
    }

    /// Splice `section_id` out of the chain.
    pub fn plan_delete(&self, section_id: &str) -> Result<DeletePlan> {
        let placement = Placement::from_predecessor(self.graph.predecessor(section_id));
        let repoints = self
            .graph
            .successors_of(section_id)
            .into_iter()
            .map(|id| Repoint {
                section_id: id.to_string(),
                placement: placement.clone(),
            })
            .collect();

        Ok(DeletePlan {
            section_id: section_id.to_string(),
            repoints,
            remaining_order: self.graph.splice_out(section_id).linearize()?,
        })
    }

    /// Check a set of sections applied together and return the order to
    /// process them in (indexes into `members`).
    ///
    /// Every desired reference is overlaid on the observed graph before the
    /// cycle check, so two members pointing at each other fail here, before
    /// any call. Existing members come predecessors first, in the combined
    /// order; members still to be created follow in the order given.
    pub fn check_batch(&self, members: &[BatchMember<'_>]) -> Result<Vec<usize>> {
        let mut combined = self.graph.clone();
        for member in members {
            if let Some(id) = member.id {
                if member.predecessor == Some(id) {
                    return Err(Error::OrderingCycle {
                        chain: vec![id.to_string(), id.to_string()],
                    });
                }
                let predecessor = member.predecessor.or(self.graph.predecessor(id));
                combined = combined.with_edge(id, predecessor);
            }
        }

        for member in members {
            if let Some(predecessor) = member.predecessor
                && !combined.contains(predecessor)
            {
                return Err(Error::UnknownPredecessor {
                    section: member.id.unwrap_or(member.name).to_string(),
                    predecessor: predecessor.to_string(),
                });
            }
        }

        let order = combined.linearize()?;
        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();

        let (mut existing, pending): (Vec<usize>, Vec<usize>) =
            (0..members.len()).partition(|&idx| members[idx].id.is_some());
        existing.sort_by_key(|&idx| members[idx].id.and_then(|id| rank.get(id).copied()));
        existing.extend(pending);
        Ok(existing)
    }

    fn require(&self, section: &str, predecessor: &str) -> Result<()> {
        if self.graph.contains(predecessor) {
            Ok(())
        } else {
            Err(Error::UnknownPredecessor {
                section: section.to_string(),
                predecessor: predecessor.to_string(),
            })
        }
    }
}
