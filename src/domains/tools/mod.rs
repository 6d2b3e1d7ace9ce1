//! Tools domain module.
//!
//! This module compiles the operations of an OpenAPI document into MCP tools:
//! a unique name, a flat input schema, and a markdown description listing
//! the operation's response codes with example payloads.
//!
//! ## Architecture
//!
//! - `config.rs` - Compiler options and the resolved, immutable configuration
//! - `naming.rs` - Tool name derivation
//! - `input_schema.rs` - Parameter and body merging into one input schema
//! - `description.rs` - Typed description sections and their rendering
//! - `compiler.rs` - Per-operation compilation and uniqueness checks
//! - `toolset.rs` - The compiled, read-only toolset
//! - `request.rs` - Prepared requests returned by tool calls
//! - `router.rs` - Dynamic ToolRouter builder
//! - `error.rs` - Tool-specific error types

mod compiler;
mod config;
pub mod description;
mod error;
mod input_schema;
mod naming;
mod request;
pub mod router;
mod toolset;

pub use compiler::{CompiledTool, ToolCompiler, ToolDefinition};
pub use config::{CompilerConfig, CompilerOptions, FALLBACK_BASE_URL, OperationFilter, normalize_base_url};
pub use description::{Description, DescriptionSection};
pub use error::ToolError;
pub use input_schema::build_input_schema;
pub use naming::tool_name;
pub use request::{PreparedRequest, prepare_request};
pub use router::{build_tool_router, call_tool};
pub use toolset::ApiToolset;
