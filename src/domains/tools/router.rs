//! Tool Router - builds the rmcp ToolRouter from a compiled toolset.
//!
//! Every compiled tool gets a dynamic route; calling it prepares the HTTP
//! request the tool stands for and returns it as structured content.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content, JsonObject},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::compiler::ToolDefinition;
use super::toolset::ApiToolset;

/// Build the tool router with one route per compiled tool.
pub fn build_tool_router<S>(toolset: Arc<ApiToolset>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    toolset
        .tools()
        .iter()
        .fold(ToolRouter::new(), |router, definition| {
            router.with_route(create_route(toolset.clone(), definition))
        })
}

fn create_route<S>(toolset: Arc<ApiToolset>, definition: &ToolDefinition) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = definition.name.clone();
    ToolRoute::new_dyn(definition.to_tool(), move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let toolset = toolset.clone();
        let name = name.clone();
        async move { Ok::<_, McpError>(call_tool(&toolset, &name, &args)) }.boxed()
    })
}

/// Execute a tool call against the toolset.
#[instrument(skip(toolset, arguments))]
pub fn call_tool(toolset: &ApiToolset, name: &str, arguments: &JsonObject) -> CallToolResult {
    let request = match toolset.prepare_request(name, arguments) {
        Ok(request) => request,
        Err(e) => {
            warn!("Tool call rejected: {}", e);
            return CallToolResult::error(vec![Content::text(e.to_string())]);
        }
    };

    let structured = match serde_json::to_value(&request) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to serialize prepared request: {}", e);
            return CallToolResult::error(vec![Content::text(format!(
                "Failed to serialize prepared request: {}",
                e
            ))]);
        }
    };

    info!("Prepared {} {}", request.method, request.url);
    CallToolResult {
        content: vec![Content::text(format!("{} {}", request.method, request.url))],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::openapi::fixtures::items_api;
    use crate::domains::tools::CompilerOptions;

    struct TestServer {}

    fn toolset() -> Arc<ApiToolset> {
        Arc::new(ApiToolset::new(&items_api(), CompilerOptions::default()).unwrap())
    }

    fn args(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(toolset());
        let tools = router.list_all();
        assert_eq!(tools.len(), 6);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"list_items"));
        assert!(names.contains(&"delete_item"));
        assert!(names.contains(&"get_health"));
    }

    #[test]
    fn test_router_matches_toolset() {
        let toolset = toolset();
        let router: ToolRouter<TestServer> = build_tool_router(toolset.clone());
        let router_tools = router.list_all();

        for definition in toolset.tools() {
            let routed = router_tools
                .iter()
                .find(|t| t.name == definition.name.as_str())
                .unwrap();
            assert_eq!(routed.description.as_deref(), Some(definition.description.as_str()));
        }
    }

    #[test]
    fn test_call_tool_success() {
        let result = call_tool(&toolset(), "get_item", &args(serde_json::json!({"item_id": 5})));
        assert_eq!(result.is_error, Some(false));

        let structured = result.structured_content.unwrap();
        assert_eq!(structured["method"], "GET");
        assert_eq!(structured["url"], "https://items.example.com/v1/items/5");

        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "GET https://items.example.com/v1/items/5");
    }

    #[test]
    fn test_call_tool_invalid_arguments() {
        let result = call_tool(&toolset(), "get_item", &JsonObject::new());
        assert!(result.is_error.unwrap_or(false));
        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert!(text.contains("item_id"));
    }

    #[test]
    fn test_call_unknown_tool() {
        let result = call_tool(&toolset(), "unknown", &JsonObject::new());
        assert!(result.is_error.unwrap_or(false));
    }
}
