//! Transport binding contracts
//!
//! The controller exposes two endpoint families for every policy object:
//!
//! - **Local** (single-tenant): `domains/{domain}/...`
//! - **Multi-tenant**: `orgs/{org}/projects/{project}/domains/{domain}/...`
//!
//! They are distinct surfaces, not one call with optional parameters, so each
//! family has its own trait. Generated client bindings implement these traits;
//! this crate never touches the wire format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::PolicyResource;

/// Result type returned by transport bindings
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// A failure reported by a transport binding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The addressed object does not exist
    #[error("object not found")]
    NotFound,

    /// The controller rejected the request because of its current state
    /// (stale revision, dangling reference, ...)
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Any other non-success HTTP status
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// The request never completed
    #[error("connection failed: {message}")]
    Connection { message: String },
}

impl TransportError {
    /// Whether repeating the same idempotent request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connection { .. } => true,
            TransportError::Status { code, .. } => *code == 429 || *code >= 500,
            TransportError::NotFound | TransportError::Conflict { .. } => false,
        }
    }
}

/// Address of the collection an object lives in.
///
/// Sections live directly under a domain; rules live under a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentPath {
    pub domain_id: String,
    pub section_id: Option<String>,
}

impl ParentPath {
    pub fn domain(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            section_id: None,
        }
    }

    pub fn section(domain_id: impl Into<String>, section_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            section_id: Some(section_id.into()),
        }
    }
}

impl fmt::Display for ParentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domains/{}", self.domain_id)?;
        if let Some(section_id) = &self.section_id {
            write!(f, "/sections/{}", section_id)?;
        }
        Ok(())
    }
}

/// Paging and filtering options for `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Opaque cursor returned by the previous page
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_ascending: Option<bool>,
    /// Include objects already marked for deletion
    pub include_mark_for_delete: bool,
}

impl ListQuery {
    pub fn page(cursor: Option<String>, page_size: u32) -> Self {
        Self {
            cursor,
            page_size: Some(page_size),
            ..Default::default()
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub results: Vec<R>,
    /// Cursor for the next page; `None` on the last page
    pub cursor: Option<String>,
    /// Total number of objects in the collection
    pub result_count: u64,
}

/// Single-tenant endpoint family.
pub trait LocalTransport<R: PolicyResource>: Send + Sync {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<R>;

    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<R>>;

    fn create(&self, parent: &ParentPath, object: &R) -> TransportResult<R>;

    /// Merge semantics: fields not set in `patch` are left unchanged remotely.
    fn patch(&self, parent: &ParentPath, id: &str, patch: &R::Patch) -> TransportResult<()>;

    /// Replace semantics: the stored object becomes `object`.
    fn update(&self, parent: &ParentPath, id: &str, object: &R) -> TransportResult<R>;

    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()>;
}

/// Organization/project-scoped endpoint family.
pub trait MultitenantTransport<R: PolicyResource>: Send + Sync {
    fn get(&self, org_id: &str, project_id: &str, parent: &ParentPath, id: &str)
    -> TransportResult<R>;

    fn list(
        &self,
        org_id: &str,
        project_id: &str,
        parent: &ParentPath,
        query: &ListQuery,
    ) -> TransportResult<Page<R>>;

    fn create(
        &self,
        org_id: &str,
        project_id: &str,
        parent: &ParentPath,
        object: &R,
    ) -> TransportResult<R>;

    fn patch(
        &self,
        org_id: &str,
        project_id: &str,
        parent: &ParentPath,
        id: &str,
        patch: &R::Patch,
    ) -> TransportResult<()>;

    fn update(
        &self,
        org_id: &str,
        project_id: &str,
        parent: &ParentPath,
        id: &str,
        object: &R,
    ) -> TransportResult<R>;

    fn delete(
        &self,
        org_id: &str,
        project_id: &str,
        parent: &ParentPath,
        id: &str,
    ) -> TransportResult<()>;
}
