//! Shared test utilities for the policy reconciler workspace.
//!
//! This crate provides an in-memory controller and object fixtures so every
//! crate tests against the same fake. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`controller`]: [`MemoryController`], a fake policy controller serving
//!   both the local and the multi-tenant API surface, with a call journal and
//!   fault injection
//! - [`fixtures`]: sections, rules and tags shaped like the acceptance tests
//! - [`logging`]: subscriber that sends `tracing` output to the test writer

pub mod controller;
pub mod fixtures;
pub mod logging;

pub use controller::{
    ControllerOptions, MemoryController, Operation, RecordedCall, ReferencedDelete, Tenancy,
};
pub use logging::init_test_logging;
