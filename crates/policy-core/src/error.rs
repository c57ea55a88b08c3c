//! Error types for policy-core

use std::path::PathBuf;

use crate::lifecycle::SectionState;

/// Result type for policy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling sections
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The predecessor graph contains a cycle. `chain` starts and ends with
    /// the same section.
    #[error("Ordering cycle: {}", chain.join(" -> "))]
    OrderingCycle { chain: Vec<String> },

    /// A section names a predecessor that does not exist in its domain
    #[error("Section '{section}' references unknown predecessor '{predecessor}'")]
    UnknownPredecessor { section: String, predecessor: String },

    /// Lifecycle step not allowed from the section's current state
    #[error("Section '{section}' cannot move from {from} to {to}")]
    InvalidTransition {
        section: String,
        from: SectionState,
        to: SectionState,
    },

    /// A field that is fixed after create differs from the remote object
    #[error("Field '{field}' of section '{section}' cannot change after create")]
    ImmutableField { section: String, field: &'static str },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Validation error from policy-model
    #[error(transparent)]
    Model(#[from] policy_model::Error),

    /// Routing or transport error from policy-client
    #[error(transparent)]
    Client(#[from] policy_client::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Whether the controller reported the addressed object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Client(err) if err.is_not_found())
    }

    /// The underlying transport failure, if any.
    pub fn transport_error(&self) -> Option<&policy_client::TransportError> {
        match self {
            Error::Client(err) => err.transport_error(),
            _ => None,
        }
    }
}
