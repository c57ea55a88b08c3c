//! Error types for policy-model

/// Result type for policy-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or validating policy objects
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value does not name any variant of the enumeration it targets
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A desired object violates a documented field constraint
    #[error("Invalid {object}: {field} {message}")]
    Validation {
        object: String,
        field: String,
        message: String,
    },
}

impl Error {
    pub fn validation(
        object: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            object: object.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
