//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults. The tool compiler itself
//! never reads the environment; this layer maps `MCP_*` variables onto
//! [`CompilerOptions`].

use super::transport::TransportConfig;
use crate::domains::openapi::DocumentSource;
use crate::domains::tools::CompilerOptions;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which API to expose and how to describe it.
    pub openapi: OpenApiConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Source document and compiler options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiConfig {
    /// Where the OpenAPI document lives. Required to start the server.
    pub source: Option<DocumentSource>,

    /// Options handed to the tool compiler.
    pub compiler: CompilerOptions,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_OPENAPI_SOURCE`, `MCP_DESCRIBE_ALL_RESPONSES`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        match std::env::var("MCP_OPENAPI_SOURCE") {
            Ok(source) => {
                let source = DocumentSource::parse(&source);
                info!("OpenAPI document source: {}", source);
                config.openapi.source = Some(source);
            }
            Err(_) => warn!("MCP_OPENAPI_SOURCE not set - no API to expose"),
        }

        let compiler = &mut config.openapi.compiler;
        compiler.name = std::env::var("MCP_SERVER_NAME").ok();
        compiler.description = std::env::var("MCP_SERVER_DESCRIPTION").ok();
        compiler.base_url = std::env::var("MCP_API_BASE_URL").ok();
        compiler.describe_all_responses = env_flag("MCP_DESCRIBE_ALL_RESPONSES");
        compiler.describe_full_response_schema = env_flag("MCP_DESCRIBE_FULL_RESPONSE_SCHEMA");
        compiler.include_operations = env_list("MCP_INCLUDE_OPERATIONS");
        compiler.exclude_operations = env_list("MCP_EXCLUDE_OPERATIONS");
        compiler.include_tags = env_list("MCP_INCLUDE_TAGS");
        compiler.exclude_tags = env_list("MCP_EXCLUDE_TAGS");

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }
}

/// `true`, `1`, `yes` and `on` (any case) enable a flag; anything else,
/// including an unset variable, leaves it off.
fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(false)
}

/// Comma-separated list; blank entries are dropped.
fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}
