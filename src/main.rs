//! MCP Server Entry Point
//!
//! Loads configuration, reads the OpenAPI document, compiles its tools and
//! starts the configured transport.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use openapi_mcp_server::core::{Config, McpServer, TransportService};
use openapi_mcp_server::domains::openapi::load_document;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let source = config
        .openapi
        .source
        .clone()
        .context("MCP_OPENAPI_SOURCE must point to an OpenAPI document (file path or URL)")?;
    let document = load_document(&source)
        .await
        .with_context(|| format!("Failed to load OpenAPI document from {}", source))?;

    let server = McpServer::new(config.clone(), &document)?;

    TransportService::new(config.transport).run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs always go to stderr; stdout belongs to the STDIO transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
