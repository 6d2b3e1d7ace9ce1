//! OpenAPI MCP Server Library
//!
//! Exposes the operations of an OpenAPI 3.x document as MCP (Model Context
//! Protocol) tools. Each operation becomes one tool with a unique name, a
//! flat JSON input schema and a markdown description of its responses,
//! including example payloads and, optionally, full response schemas.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **openapi**: document loading, `$ref` resolution, example synthesis
//!   - **tools**: tool compilation, descriptions and request preparation
//!
//! # Example
//!
//! ```rust,no_run
//! use openapi_mcp_server::core::{Config, McpServer, TransportService};
//! use openapi_mcp_server::domains::openapi::{DocumentSource, load_document};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let document = load_document(&DocumentSource::parse("./openapi.json")).await?;
//!     let server = McpServer::new(config.clone(), &document)?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::openapi::OpenApiDocument;
pub use domains::tools::{ApiToolset, CompilerOptions};
