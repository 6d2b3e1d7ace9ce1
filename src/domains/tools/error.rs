//! Tool-specific error types.

use thiserror::Error;

use crate::domains::openapi::OpenApiError;

/// Errors that can occur while compiling or invoking tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Two operations map to the same tool name.
    #[error("Duplicate tool name '{0}': operation identifiers must be unique")]
    DuplicateName(String),

    /// An operation documents no 2xx response.
    #[error("Operation '{operation}' declares no success (2xx) response")]
    MissingSuccessStatus { operation: String },

    /// The compiler options are contradictory or unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The source document could not be interpreted.
    #[error(transparent)]
    OpenApi(#[from] OpenApiError),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "missing success status" error.
    pub fn missing_success_status(operation: impl Into<String>) -> Self {
        Self::MissingSuccessStatus {
            operation: operation.into(),
        }
    }

    /// Create a new "invalid configuration" error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
