//! Predecessor graph over sibling sections
//!
//! Each node names at most one predecessor. The graph is a value: overlays
//! and splices return a new graph and never touch the one they start from,
//! so a reconciliation pass can build it from a fresh listing and reason
//! about "what if" states without stale references.

use std::collections::{HashMap, HashSet};

use policy_model::Section;

use crate::{Error, Result};

/// Map from section id to predecessor id, remembering insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredecessorGraph {
    /// Node ids in insertion order; orders roots and siblings
    nodes: Vec<String>,
    predecessors: HashMap<String, Option<String>>,
}

impl PredecessorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, predecessor)` pairs. A repeated id keeps its first
    /// position and takes the last predecessor.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (id, predecessor) in pairs {
            graph.set(id.into(), predecessor.map(Into::into));
        }
        graph
    }

    /// Build from sections in controller order.
    ///
    /// A section's predecessor is, in turn: its `predecessor_ref` when that
    /// names a sibling listed before it, the anchor recorded for it in
    /// `anchors` (an anchor of `None` makes it a root), or the sibling listed
    /// directly before it. Every edge points backwards in the listing, so an
    /// observed graph never holds a cycle. Sections without an id are skipped.
    pub fn from_listing(sections: &[Section], anchors: &HashMap<String, Option<String>>) -> Self {
        let mut graph = Self::new();
        let mut previous: Option<&str> = None;

        for section in sections {
            let Some(id) = section.id() else {
                continue;
            };
            let predecessor = match section.predecessor_ref.as_deref() {
                Some(hint) if graph.contains(hint) => Some(hint),
                _ => match anchors.get(id) {
                    Some(None) => None,
                    Some(Some(anchor)) if graph.contains(anchor) => Some(anchor.as_str()),
                    _ => previous,
                },
            }
            .map(str::to_string);

            graph.set(id.to_string(), predecessor);
            previous = Some(id);
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predecessors.contains_key(id)
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn predecessor(&self, id: &str) -> Option<&str> {
        self.predecessors.get(id).and_then(|p| p.as_deref())
    }

    /// Nodes naming `id` as predecessor, in insertion order.
    pub fn successors_of(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| self.predecessor(n) == Some(id))
            .map(String::as_str)
            .collect()
    }

    /// A copy with `id` pointing at `predecessor`. A new id is appended.
    pub fn with_edge(&self, id: &str, predecessor: Option<&str>) -> Self {
        let mut graph = self.clone();
        graph.set(id.to_string(), predecessor.map(str::to_string));
        graph
    }

    /// A copy without `id`, its successors re-pointed to its predecessor.
    pub fn splice_out(&self, id: &str) -> Self {
        let replacement = self.predecessor(id).map(str::to_string);
        let mut graph = Self::new();
        for node in self.nodes.iter().filter(|n| n.as_str() != id) {
            let predecessor = match self.predecessor(node) {
                Some(p) if p == id => replacement.clone(),
                other => other.map(str::to_string),
            };
            graph.set(node.clone(), predecessor);
        }
        graph
    }

    /// Fail with [`Error::OrderingCycle`] if any predecessor chain loops.
    ///
    /// Walks are bounded by the node count. A predecessor outside the graph
    /// ends a chain like a root does.
    pub fn validate(&self) -> Result<()> {
        let mut settled: HashSet<&str> = HashSet::new();

        for start in &self.nodes {
            let mut chain: Vec<&str> = Vec::new();
            let mut on_chain: HashSet<&str> = HashSet::new();
            let mut current = Some(start.as_str());

            while let Some(id) = current {
                if settled.contains(id) || !self.contains(id) {
                    break;
                }
                if !on_chain.insert(id) || chain.len() > self.nodes.len() {
                    let loop_start = chain.iter().position(|c| *c == id).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        chain[loop_start..].iter().map(|c| c.to_string()).collect();
                    cycle.push(id.to_string());
                    return Err(Error::OrderingCycle { chain: cycle });
                }
                chain.push(id);
                current = self.predecessor(id);
            }

            settled.extend(chain);
        }

        Ok(())
    }

    /// The single total order implied by the graph.
    ///
    /// Depth first from each root, roots in insertion order, each node's
    /// successors in insertion order: the first successor to claim a
    /// predecessor sits directly after it, later ones after the first one's
    /// subtree.
    pub fn linearize(&self) -> Result<Vec<String>> {
        self.validate()?;

        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut roots = Vec::new();
        for node in &self.nodes {
            match self.predecessor(node) {
                Some(p) if self.contains(p) => children.entry(p).or_default().push(node),
                _ => roots.push(node.as_str()),
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&str> = roots.into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            order.push(id.to_string());
            if let Some(kids) = children.get(id) {
                stack.extend(kids.iter().rev());
            }
        }

        Ok(order)
    }

    fn set(&mut self, id: String, predecessor: Option<String>) {
        if !self.predecessors.contains_key(&id) {
            self.nodes.push(id.clone());
        }
        self.predecessors.insert(id, predecessor);
    }
}
