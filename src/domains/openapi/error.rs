//! OpenAPI-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or interpreting an OpenAPI document.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// The document file could not be read.
    #[error("Failed to read OpenAPI document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be fetched over HTTP.
    #[error("Failed to fetch OpenAPI document from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The document is not valid JSON.
    #[error("Invalid JSON in OpenAPI document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is JSON but not a usable OpenAPI 3.x document.
    #[error("Invalid OpenAPI document: {0}")]
    InvalidDocument(String),

    /// A `$ref` points at something the document does not contain.
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),
}

impl OpenApiError {
    /// Create a new "invalid document" error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a new "unresolved reference" error.
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedReference(reference.into())
    }
}
