//! Section ordering
//!
//! Sections form chains through `predecessor_ref`: a section sits directly
//! after the sibling it names. [`PredecessorGraph`] turns the flat references
//! into a total order and rejects cycles; [`OrderingEngine`] plans the calls
//! that move a domain from its observed order to the desired one.
//!
//! The observed graph is read off the listing order. Echoed references and
//! the placements recorded in an [`AnchorBook`] refine it where present.

mod anchors;
mod engine;
mod graph;

pub use anchors::AnchorBook;
pub use engine::{BatchMember, DeletePlan, OrderingEngine, Repoint};
pub use graph::PredecessorGraph;
