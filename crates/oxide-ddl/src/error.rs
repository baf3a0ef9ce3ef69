//! Error types for the schema compiler.

/// Errors that can occur while compiling schema operations.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The operation is malformed (empty column set, empty name, ...).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The target dialect has no way of expressing the operation.
    #[error("Operation '{operation}' is not supported by the {dialect} dialect")]
    UnsupportedOperation {
        /// The dialect that rejected the operation.
        dialect: &'static str,
        /// The operation that was requested.
        operation: &'static str,
    },

    /// A generated name still exceeds the identifier limit after hashing.
    #[error("Generated name '{name}' exceeds the identifier limit of {limit} characters")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// The dialect's identifier limit.
        limit: usize,
    },

    /// No dialect is registered under the given identifier.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// IO error (reading migration unit files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompileError {
    /// Shorthand for [`CompileError::InvalidOperation`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;
