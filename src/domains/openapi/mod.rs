//! OpenAPI domain module.
//!
//! This module turns an OpenAPI 3.x JSON document into plain operation
//! descriptors that the tool compiler consumes.
//!
//! ## Architecture
//!
//! - `loader.rs` - Reads the document from a file or URL
//! - `document.rs` - Document validation and operation extraction
//! - `descriptor.rs` - Operation, parameter and response descriptors
//! - `refs.rs` - Local `$ref` resolution
//! - `example.rs` - Example payload synthesis from schemas
//! - `error.rs` - OpenAPI-specific error types

mod descriptor;
mod document;
mod error;
pub mod example;
mod loader;
mod refs;

#[cfg(test)]
pub(crate) mod fixtures;

pub use descriptor::{
    HttpMethod, ModelRef, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    RequestBodyDescriptor, ResponseDescriptor, StatusCode,
};
pub use document::{ApiInfo, OpenApiDocument};
pub use error::OpenApiError;
pub use loader::{DocumentSource, load_document};
pub use refs::RefResolver;
