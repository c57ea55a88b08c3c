//! Tenant-aware dispatch of policy operations
//!
//! [`ClientContextRouter`] picks the endpoint family for its tenant mode once,
//! at construction, and holds it behind the [`Endpoint`] trait. Callers never
//! see the mode again: the local variant calls `domains/...` endpoints, the
//! multi-tenant variant prefixes every call with the configured organization
//! and the context's project.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{RetryPolicy, RoutingConfig};
use crate::context::ClientContext;
use crate::resource::PolicyResource;
use crate::tenant::TenantMode;
use crate::transport::{
    ListQuery, LocalTransport, MultitenantTransport, Page, ParentPath, TransportError,
    TransportResult,
};
use crate::{Error, Result};

/// Uniform view over one API surface for one object kind.
trait Endpoint<R: PolicyResource>: Send + Sync {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<R>;
    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<R>>;
    fn create(&self, parent: &ParentPath, object: &R) -> TransportResult<R>;
    fn patch(&self, parent: &ParentPath, id: &str, patch: &R::Patch) -> TransportResult<()>;
    fn update(&self, parent: &ParentPath, id: &str, object: &R) -> TransportResult<R>;
    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()>;
}

struct LocalEndpoint<R: PolicyResource> {
    transport: Arc<dyn LocalTransport<R>>,
}

impl<R: PolicyResource> Endpoint<R> for LocalEndpoint<R> {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<R> {
        self.transport.get(parent, id)
    }

    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<R>> {
        self.transport.list(parent, query)
    }

    fn create(&self, parent: &ParentPath, object: &R) -> TransportResult<R> {
        self.transport.create(parent, object)
    }

    fn patch(&self, parent: &ParentPath, id: &str, patch: &R::Patch) -> TransportResult<()> {
        self.transport.patch(parent, id, patch)
    }

    fn update(&self, parent: &ParentPath, id: &str, object: &R) -> TransportResult<R> {
        self.transport.update(parent, id, object)
    }

    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.transport.delete(parent, id)
    }
}

struct MultitenantEndpoint<R: PolicyResource> {
    org_id: String,
    project_id: String,
    transport: Arc<dyn MultitenantTransport<R>>,
}

impl<R: PolicyResource> Endpoint<R> for MultitenantEndpoint<R> {
    fn get(&self, parent: &ParentPath, id: &str) -> TransportResult<R> {
        self.transport.get(&self.org_id, &self.project_id, parent, id)
    }

    fn list(&self, parent: &ParentPath, query: &ListQuery) -> TransportResult<Page<R>> {
        self.transport
            .list(&self.org_id, &self.project_id, parent, query)
    }

    fn create(&self, parent: &ParentPath, object: &R) -> TransportResult<R> {
        self.transport
            .create(&self.org_id, &self.project_id, parent, object)
    }

    fn patch(&self, parent: &ParentPath, id: &str, patch: &R::Patch) -> TransportResult<()> {
        self.transport
            .patch(&self.org_id, &self.project_id, parent, id, patch)
    }

    fn update(&self, parent: &ParentPath, id: &str, object: &R) -> TransportResult<R> {
        self.transport
            .update(&self.org_id, &self.project_id, parent, id, object)
    }

    fn delete(&self, parent: &ParentPath, id: &str) -> TransportResult<()> {
        self.transport
            .delete(&self.org_id, &self.project_id, parent, id)
    }
}

/// Routes CRUD calls for one object kind to the surface chosen at construction.
///
/// Reads (`get`, `list`) are retried on retryable transport failures according
/// to the configured [`RetryPolicy`]; mutations are issued exactly once.
pub struct ClientContextRouter<R: PolicyResource> {
    endpoint: Box<dyn Endpoint<R>>,
    tenant_mode: TenantMode,
    retry: RetryPolicy,
    page_size: u32,
}

impl<R: PolicyResource> ClientContextRouter<R> {
    /// Bind a router to the surface matching the context's tenant mode.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedTenantMode`] if the connector does not offer the
    ///   surface for this object kind
    /// - [`Error::MissingProjectId`] for a multi-tenant context without project
    pub fn new(context: &ClientContext, config: &RoutingConfig) -> Result<Self> {
        let tenant_mode = context.tenant_mode();
        let unsupported = || Error::UnsupportedTenantMode {
            mode: format!("{} ({} endpoints unavailable)", tenant_mode, R::KIND),
        };

        let endpoint: Box<dyn Endpoint<R>> = match tenant_mode {
            TenantMode::Local => {
                let transport = R::local_binding(context.connector()).ok_or_else(unsupported)?;
                Box::new(LocalEndpoint { transport })
            }
            TenantMode::Multitenant => {
                let project_id = context.project_id().ok_or(Error::MissingProjectId)?;
                let transport =
                    R::multitenant_binding(context.connector()).ok_or_else(unsupported)?;
                Box::new(MultitenantEndpoint {
                    org_id: config.default_org_id.clone(),
                    project_id: project_id.to_string(),
                    transport,
                })
            }
        };

        tracing::debug!(kind = R::KIND, %tenant_mode, "Bound client context router");

        Ok(Self {
            endpoint,
            tenant_mode,
            retry: config.read_retry.clone(),
            page_size: config.page_size.max(1),
        })
    }

    pub fn tenant_mode(&self) -> TenantMode {
        self.tenant_mode
    }

    pub fn get(&self, parent: &ParentPath, id: &str) -> Result<R> {
        tracing::debug!(kind = R::KIND, %parent, id, "get");
        self.read("get", parent, id, || self.endpoint.get(parent, id))
    }

    pub fn list(&self, parent: &ParentPath, query: &ListQuery) -> Result<Page<R>> {
        tracing::debug!(kind = R::KIND, %parent, cursor = ?query.cursor, "list");
        self.read("list", parent, "*", || self.endpoint.list(parent, query))
    }

    /// Fetch every object in the collection, following cursors, in the order
    /// the controller returns them.
    ///
    /// Stops once the controller's `result_count` is reached or a cursor comes
    /// back a second time.
    pub fn list_all(&self, parent: &ParentPath) -> Result<Vec<R>> {
        let mut results = Vec::new();
        let mut cursor = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let page = self.list(parent, &ListQuery::page(cursor.take(), self.page_size))?;
            let fetched = page.results.len();
            results.extend(page.results);

            let complete = page.result_count > 0 && results.len() as u64 >= page.result_count;
            match page.cursor {
                Some(next) if fetched > 0 && !complete => {
                    if !seen_cursors.insert(next.clone()) {
                        tracing::warn!(
                            kind = R::KIND,
                            %parent,
                            cursor = %next,
                            fetched = results.len(),
                            "Controller repeated a list cursor, stopping"
                        );
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(results)
    }

    /// Create an object. Never retried: a repeated create could duplicate it.
    pub fn create(&self, parent: &ParentPath, object: &R) -> Result<R> {
        let label = object.id().unwrap_or(object.display_name()).to_string();
        tracing::info!(kind = R::KIND, %parent, object = %label, "create");
        self.endpoint
            .create(parent, object)
            .map_err(|err| self.failure("create", parent, &label, err))
    }

    pub fn patch(&self, parent: &ParentPath, id: &str, patch: &R::Patch) -> Result<()> {
        tracing::info!(kind = R::KIND, %parent, id, ?patch, "patch");
        self.endpoint
            .patch(parent, id, patch)
            .map_err(|err| self.failure("patch", parent, id, err))
    }

    pub fn update(&self, parent: &ParentPath, id: &str, object: &R) -> Result<R> {
        tracing::info!(kind = R::KIND, %parent, id, "update");
        self.endpoint
            .update(parent, id, object)
            .map_err(|err| self.failure("update", parent, id, err))
    }

    pub fn delete(&self, parent: &ParentPath, id: &str) -> Result<()> {
        tracing::info!(kind = R::KIND, %parent, id, "delete");
        self.endpoint
            .delete(parent, id)
            .map_err(|err| self.failure("delete", parent, id, err))
    }

    fn read<T>(
        &self,
        operation: &'static str,
        parent: &ParentPath,
        object: &str,
        mut call: impl FnMut() -> TransportResult<T>,
    ) -> Result<T> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;

        let outcome = backoff::retry(self.retry.backoff(), || {
            attempt += 1;
            call().map_err(|err| {
                if err.is_retryable() && attempt < max_attempts {
                    tracing::warn!(
                        kind = R::KIND,
                        operation,
                        %parent,
                        object,
                        attempt,
                        error = %err,
                        "Retrying read after transport failure"
                    );
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        });

        outcome.map_err(|err| {
            let err = match err {
                backoff::Error::Permanent(err) => err,
                backoff::Error::Transient { err, .. } => err,
            };
            self.failure(operation, parent, object, err)
        })
    }

    fn failure(
        &self,
        operation: &'static str,
        parent: &ParentPath,
        object: &str,
        err: TransportError,
    ) -> Error {
        match err {
            TransportError::NotFound => Error::NotFound {
                operation,
                kind: R::KIND,
                parent: parent.to_string(),
                object: object.to_string(),
            },
            source => Error::Transport {
                operation,
                kind: R::KIND,
                parent: parent.to_string(),
                object: object.to_string(),
                source,
            },
        }
    }
}
