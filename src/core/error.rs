//! Error types for the server binary and library entry points.
//!
//! Domain errors (document parsing, tool compilation) convert into [`Error`]
//! so startup code can propagate them with `?`.

use thiserror::Error;

use super::transport::TransportError;
use crate::domains::openapi::OpenApiError;
use crate::domains::tools::ToolError;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the server.
#[derive(Debug, Error)]
pub enum Error {
    /// The OpenAPI document could not be loaded or understood.
    #[error("OpenAPI error: {0}")]
    OpenApi(#[from] OpenApiError),

    /// Tool compilation or invocation failed.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// The transport failed to start or stopped abnormally.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
