//! Tenant mode selection
//!
//! The mode decides which API surface backs a client context. It is read
//! once, when the router is constructed, and never inspected again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which controller API surface a client context addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantMode {
    /// Single-tenant surface: objects live directly under a domain
    #[default]
    Local,
    /// Organization/project-scoped surface
    Multitenant,
}

impl FromStr for TenantMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "single-tenant" => Ok(TenantMode::Local),
            "multitenant" | "multi-tenant" | "multitenancy" => Ok(TenantMode::Multitenant),
            _ => Err(Error::UnsupportedTenantMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TenantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantMode::Local => write!(f, "local"),
            TenantMode::Multitenant => write!(f, "multitenant"),
        }
    }
}
