//! Client context: the immutable pairing of tenant mode, project and connector

use std::fmt;
use std::sync::Arc;

use crate::resource::Connector;
use crate::tenant::TenantMode;

/// Everything needed to build routers for one tenant.
///
/// Immutable after construction. Each reconciliation run owns its context;
/// cloning shares the connector, not any mutable state.
#[derive(Clone)]
pub struct ClientContext {
    tenant_mode: TenantMode,
    project_id: Option<String>,
    connector: Arc<dyn Connector>,
}

impl ClientContext {
    pub fn new(
        tenant_mode: TenantMode,
        project_id: Option<String>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            tenant_mode,
            project_id,
            connector,
        }
    }

    /// Context for the single-tenant surface.
    pub fn local(connector: Arc<dyn Connector>) -> Self {
        Self::new(TenantMode::Local, None, connector)
    }

    /// Context for the organization/project-scoped surface.
    pub fn multitenant(project_id: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        Self::new(TenantMode::Multitenant, Some(project_id.into()), connector)
    }

    pub fn tenant_mode(&self) -> TenantMode {
        self.tenant_mode
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("tenant_mode", &self.tenant_mode)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
