//! Domains module containing business logic organized by bounded contexts.
//!
//! - **openapi**: loading and interpreting OpenAPI 3.x documents
//! - **tools**: compiling operations into MCP tools and preparing calls

pub mod openapi;
pub mod tools;
