//! Reconciliation core for firewall policy sections
//!
//! This crate turns desired sections into controller calls:
//!
//! - **Ordering**: [`PredecessorGraph`] and [`OrderingEngine`] resolve
//!   `predecessor_ref` chains into one total order, reject cycles before any
//!   call, and splice successors when a section is deleted
//! - **Diff**: [`plan_rules`] matches rules by id and decides between per-rule
//!   operations and a full-replace update; [`diff_section`] finds changed
//!   section fields, comparing tags as sets
//! - **Lifecycle**: [`TrackedSection`] moves through [`SectionState`] and only
//!   advances on a successful remote call
//! - **PolicyReconciler**: create, read, import, update, delete and batch
//!   apply over a [`policy_client::ClientContextRouter`]
//!
//! # Architecture
//!
//! ```text
//!                PolicyReconciler
//!               /        |        \
//!   OrderingEngine   plan_rules   TrackedSection
//!               \        |        /
//!              ClientContextRouter (policy-client)
//!                        |
//!                 policy-model types
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod ordering;
pub mod reconciler;

pub use config::ReconcilerConfig;
pub use diff::{RuleChanges, RulePlan, diff_rule, diff_section, plan_rules};
pub use error::{Error, Result};
pub use lifecycle::{SectionState, TrackedSection};
pub use ordering::{
    AnchorBook, BatchMember, DeletePlan, OrderingEngine, PredecessorGraph, Repoint,
};
pub use reconciler::PolicyReconciler;
