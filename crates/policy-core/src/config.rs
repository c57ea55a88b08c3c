//! Reconciler configuration
//!
//! ```toml
//! domain_id = "default"
//! splice_before_delete = true
//! verify_after_delete = true
//!
//! [routing]
//! default_org_id = "default"
//! page_size = 1000
//! ```

use std::path::Path;

use policy_client::RoutingConfig;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings for one [`crate::PolicyReconciler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Domain every section lives in
    #[serde(default = "default_domain_id")]
    pub domain_id: String,
    /// Re-point siblings that reference a section before deleting it.
    /// Required when the controller rejects dangling references.
    #[serde(default = "default_true")]
    pub splice_before_delete: bool,
    /// List siblings after a delete and repair any that still point at the
    /// deleted section
    #[serde(default = "default_true")]
    pub verify_after_delete: bool,
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_domain_id() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            domain_id: default_domain_id(),
            splice_before_delete: default_true(),
            verify_after_delete: default_true(),
            routing: RoutingConfig::default(),
        }
    }
}

impl ReconcilerConfig {
    pub fn for_domain(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load reconciler configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
