//! MCP server handler.
//!
//! The server owns one compiled [`ApiToolset`] and a `ToolRouter` built from
//! it. Both are immutable after construction; cloning the server (one clone
//! per TCP session) only bumps reference counts.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::openapi::OpenApiDocument;
use crate::domains::tools::{ApiToolset, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tools compiled from the OpenAPI document.
    toolset: Arc<ApiToolset>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Compile `document` under the configured options and build the router.
    pub fn new(config: Config, document: &OpenApiDocument) -> super::error::Result<Self> {
        let toolset = Arc::new(ApiToolset::new(
            document,
            config.openapi.compiler.clone(),
        )?);
        info!(
            "Compiled {} tools: {}",
            toolset.tools().len(),
            toolset.tool_names().join(", ")
        );

        Ok(Self {
            tool_router: build_tool_router::<Self>(toolset.clone()),
            config: Arc::new(config),
            toolset,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        env!("CARGO_PKG_NAME")
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the compiled toolset.
    pub fn toolset(&self) -> &Arc<ApiToolset> {
        &self.toolset
    }

    /// Instructions advertised to clients during initialization.
    pub fn instructions(&self) -> String {
        let mut text = format!(
            "Tools for the '{}' API at {}.",
            self.toolset.name(),
            self.toolset.base_url()
        );
        if let Some(description) = self.toolset.description() {
            text.push_str("\n\n");
            text.push_str(description);
        }
        text.push_str(
            "\n\nEach tool corresponds to one API operation. Calling a tool returns \
             the HTTP request (method, URL, headers and body) that performs the \
             operation; the request is not sent.",
        );
        text
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.toolset.name().to_string(),
                version: self.version().to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
