//! Policy object kinds the router can address, and the connector that hands
//! out their transport bindings

use std::fmt;
use std::sync::Arc;

use policy_model::{Rule, RulePatch, Section, SectionPatch};

use crate::transport::{LocalTransport, MultitenantTransport};

/// Source of transport bindings, one per API surface and object kind.
///
/// A connector returns `None` for a surface it does not offer (for example a
/// controller release without the multi-tenant API).
pub trait Connector: Send + Sync {
    fn local_sections(&self) -> Option<Arc<dyn LocalTransport<Section>>> {
        None
    }

    fn local_rules(&self) -> Option<Arc<dyn LocalTransport<Rule>>> {
        None
    }

    fn multitenant_sections(&self) -> Option<Arc<dyn MultitenantTransport<Section>>> {
        None
    }

    fn multitenant_rules(&self) -> Option<Arc<dyn MultitenantTransport<Rule>>> {
        None
    }
}

/// An object kind with its own endpoints on both API surfaces.
pub trait PolicyResource: Clone + fmt::Debug + Send + Sync + 'static {
    /// Partial-update payload accepted by `patch`
    type Patch: fmt::Debug + Send + Sync;

    /// Name used in logs and errors
    const KIND: &'static str;

    fn id(&self) -> Option<&str>;

    /// Human-readable name, used when there is no id yet.
    fn display_name(&self) -> &str;

    fn local_binding(connector: &dyn Connector) -> Option<Arc<dyn LocalTransport<Self>>>;

    fn multitenant_binding(connector: &dyn Connector)
    -> Option<Arc<dyn MultitenantTransport<Self>>>;
}

impl PolicyResource for Section {
    type Patch = SectionPatch;

    const KIND: &'static str = "section";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn local_binding(connector: &dyn Connector) -> Option<Arc<dyn LocalTransport<Self>>> {
        connector.local_sections()
    }

    fn multitenant_binding(
        connector: &dyn Connector,
    ) -> Option<Arc<dyn MultitenantTransport<Self>>> {
        connector.multitenant_sections()
    }
}

impl PolicyResource for Rule {
    type Patch = RulePatch;

    const KIND: &'static str = "rule";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn local_binding(connector: &dyn Connector) -> Option<Arc<dyn LocalTransport<Self>>> {
        connector.local_rules()
    }

    fn multitenant_binding(
        connector: &dyn Connector,
    ) -> Option<Arc<dyn MultitenantTransport<Self>>> {
        connector.multitenant_rules()
    }
}
