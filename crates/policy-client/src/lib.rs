//! Tenant-aware client layer for the firewall policy reconciler
//!
//! This crate sits between the reconciler and the generated controller
//! bindings:
//!
//! - **Transport contracts**: [`LocalTransport`] and [`MultitenantTransport`],
//!   one trait per controller API surface
//! - **Connector**: hands out the bindings a controller offers
//! - **Client context**: tenant mode + project + connector, immutable
//! - **Router**: [`ClientContextRouter`] binds one surface at construction and
//!   exposes `get`/`list`/`create`/`patch`/`update`/`delete`
//! - **Routing configuration**: default organization, paging, read retries
//!
//! # Architecture
//!
//! ```text
//!                 policy-core
//!                      |
//!          ClientContextRouter<R>
//!              /            \
//!   LocalTransport<R>   MultitenantTransport<R>
//!              \            /
//!            generated bindings
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod resource;
pub mod router;
pub mod tenant;
pub mod transport;

pub use config::{RetryPolicy, RoutingConfig};
pub use context::ClientContext;
pub use error::{Error, Result};
pub use resource::{Connector, PolicyResource};
pub use router::ClientContextRouter;
pub use tenant::TenantMode;
pub use transport::{
    ListQuery, LocalTransport, MultitenantTransport, Page, ParentPath, TransportError,
    TransportResult,
};
