//! Routing configuration
//!
//! Loaded from the `[routing]` table of the reconciler configuration or from
//! a standalone TOML file:
//!
//! ```toml
//! default_org_id = "default"
//! page_size = 1000
//!
//! [read_retry]
//! max_attempts = 3
//! initial_interval_ms = 50
//! max_interval_ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Scoping and retry settings for a [`crate::ClientContextRouter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Organization used for every multi-tenant call
    #[serde(default = "default_org_id")]
    pub default_org_id: String,
    /// Page size requested by `list_all`
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Retry policy for idempotent reads
    #[serde(default)]
    pub read_retry: RetryPolicy,
}

fn default_org_id() -> String {
    "default".to_string()
}

fn default_page_size() -> u32 {
    1000
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_org_id: default_org_id(),
            page_size: default_page_size(),
            read_retry: RetryPolicy::default(),
        }
    }
}

impl RoutingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load routing configuration from a TOML file.
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

/// Exponential backoff for `get` and `list`. Mutations are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retries
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_interval_ms() -> u64 {
    50
}

fn default_max_interval_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff schedule. Attempts are bounded by `max_attempts`, not by time.
    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        let initial = Duration::from_millis(self.initial_interval_ms);
        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: Duration::from_millis(self.max_interval_ms.max(self.initial_interval_ms)),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}
