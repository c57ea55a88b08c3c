//! Error types for policy-client

use std::path::PathBuf;

use crate::transport::TransportError;

/// Result type for policy-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the router and its configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The controller call failed
    #[error("{operation} {kind} '{object}' in {parent} failed: {source}")]
    Transport {
        operation: &'static str,
        kind: &'static str,
        parent: String,
        object: String,
        #[source]
        source: TransportError,
    },

    /// The addressed object does not exist on the controller
    #[error("{kind} '{object}' not found in {parent} during {operation}")]
    NotFound {
        operation: &'static str,
        kind: &'static str,
        parent: String,
        object: String,
    },

    /// The tenant mode is unknown or not offered by the connector
    #[error("Unsupported tenant mode: {mode}")]
    UnsupportedTenantMode { mode: String },

    /// A multi-tenant context was built without a project
    #[error("Multi-tenant client context requires a project id")]
    MissingProjectId,

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// The underlying transport failure, if this error came from a call.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Error::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
