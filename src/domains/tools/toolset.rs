//! The compiled toolset - configuration plus read-only tools.

use rmcp::model::JsonObject;
use std::collections::HashMap;
use tracing::{info, instrument};

use super::compiler::{CompiledTool, ToolCompiler, ToolDefinition};
use super::config::{CompilerConfig, CompilerOptions};
use super::error::ToolError;
use super::request::{PreparedRequest, prepare_request};
use crate::domains::openapi::{ApiInfo, OpenApiDocument, OperationDescriptor};

/// Every tool compiled from one API, in document order.
///
/// Built once; never mutated afterwards, so it can be shared freely across
/// sessions behind an `Arc`.
#[derive(Debug)]
pub struct ApiToolset {
    config: CompilerConfig,
    tools: Vec<ToolDefinition>,
    operations: Vec<OperationDescriptor>,
    index: HashMap<String, usize>,
}

impl ApiToolset {
    /// Compile the tools of `document` under `options`.
    #[instrument(skip_all, fields(api = %document.info().title))]
    pub fn new(document: &OpenApiDocument, options: CompilerOptions) -> Result<Self, ToolError> {
        Self::from_operations(
            document.info(),
            document.default_server_url(),
            document.operations()?,
            options,
        )
    }

    /// Compile already extracted operations.
    pub fn from_operations(
        info: &ApiInfo,
        default_server: Option<&str>,
        operations: Vec<OperationDescriptor>,
        options: CompilerOptions,
    ) -> Result<Self, ToolError> {
        let config = CompilerConfig::resolve(options, info, default_server)?;
        let compiled = ToolCompiler::new(&config).compile(operations)?;

        let mut tools = Vec::with_capacity(compiled.len());
        let mut operations = Vec::with_capacity(compiled.len());
        let mut index = HashMap::with_capacity(compiled.len());
        for (position, CompiledTool { definition, operation }) in compiled.into_iter().enumerate() {
            index.insert(definition.name.clone(), position);
            tools.push(definition);
            operations.push(operation);
        }

        info!(
            "Toolset '{}' ready: {} tools against {}",
            config.name(),
            tools.len(),
            config.base_url()
        );

        Ok(Self {
            config,
            tools,
            operations,
            index,
        })
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.config.description()
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn describe_all_responses(&self) -> bool {
        self.config.describe_all_responses()
    }

    pub fn describe_full_response_schema(&self) -> bool {
        self.config.describe_full_response_schema()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// All tools, in document order.
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// The operation a tool was compiled from.
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// Resolve a tool call into the HTTP request it stands for.
    pub fn prepare_request(
        &self,
        name: &str,
        arguments: &JsonObject,
    ) -> Result<PreparedRequest, ToolError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| ToolError::not_found(name))?;
        prepare_request(self.base_url(), operation, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::openapi::fixtures::items_api;
    use crate::domains::tools::description::{EXAMPLE_RESPONSE_MARKER, OUTPUT_SCHEMA_MARKER};

    fn toolset(options: CompilerOptions) -> ApiToolset {
        ApiToolset::new(&items_api(), options).unwrap()
    }

    fn count(text: &str, marker: &str) -> usize {
        text.matches(marker).count()
    }

    fn body_bearing(tool: &ToolDefinition) -> bool {
        tool.name != "delete_item"
    }

    #[test]
    fn test_default_configuration() {
        let set = toolset(CompilerOptions::default());
        assert_eq!(set.name(), "Item API");
        assert_eq!(set.description(), Some("A simple API for managing items"));
        assert_eq!(set.base_url(), "https://items.example.com/v1");
        assert!(!set.describe_all_responses());
        assert!(!set.describe_full_response_schema());
    }

    #[test]
    fn test_base_url_normalization() {
        let set = toolset(CompilerOptions {
            base_url: Some("http://example.com/api/".to_string()),
            ..Default::default()
        });
        assert_eq!(set.base_url(), "http://example.com/api");

        let set = toolset(CompilerOptions {
            base_url: Some("http://example.com/api".to_string()),
            ..Default::default()
        });
        assert_eq!(set.base_url(), "http://example.com/api");
    }

    #[test]
    fn test_describe_default() {
        let set = toolset(CompilerOptions {
            base_url: Some("http://example.com".to_string()),
            ..Default::default()
        });
        for tool in set.tools() {
            let text = &tool.description;
            if body_bearing(tool) {
                assert_eq!(count(text, "**200**"), 1, "{}", tool.name);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 1, "{}", tool.name);
            } else {
                assert_eq!(count(text, "**200**"), 0);
                assert_eq!(count(text, "**204**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 0);
            }
            assert_eq!(count(text, "**422**"), 0);
            assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 0);
        }
    }

    #[test]
    fn test_describe_all_responses() {
        let set = toolset(CompilerOptions {
            describe_all_responses: true,
            ..Default::default()
        });
        for tool in set.tools().iter().filter(|t| t.name != "get_health") {
            let text = &tool.description;
            assert_eq!(count(text, "**422**"), 1, "{}", tool.name);
            assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 0);
            if body_bearing(tool) {
                assert_eq!(count(text, "**200**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 2);
            } else {
                assert_eq!(count(text, "**204**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 1);
            }
        }
    }

    #[test]
    fn test_describe_full_response_schema() {
        let set = toolset(CompilerOptions {
            describe_full_response_schema: true,
            ..Default::default()
        });
        for tool in set.tools() {
            let text = &tool.description;
            if body_bearing(tool) {
                assert_eq!(count(text, "**200**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 1);
                assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 1);
            } else {
                assert_eq!(count(text, "**200**"), 0);
                assert_eq!(count(text, "**204**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 0);
                assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 0);
            }
        }
    }

    #[test]
    fn test_describe_all_responses_and_full_schema() {
        let set = toolset(CompilerOptions {
            describe_all_responses: true,
            describe_full_response_schema: true,
            ..Default::default()
        });
        for tool in set.tools().iter().filter(|t| t.name != "get_health") {
            let text = &tool.description;
            assert_eq!(count(text, "**422**"), 1);
            if body_bearing(tool) {
                assert_eq!(count(text, "**200**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 2);
                assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 2);
            } else {
                assert_eq!(count(text, "**200**"), 0);
                assert_eq!(count(text, "**204**"), 1);
                assert_eq!(count(text, EXAMPLE_RESPONSE_MARKER), 1);
                assert_eq!(count(text, OUTPUT_SCHEMA_MARKER), 1);
            }
        }
    }

    #[test]
    fn test_all_responses_never_decreases_markers() {
        let default = toolset(CompilerOptions::default());
        let all = toolset(CompilerOptions {
            describe_all_responses: true,
            ..Default::default()
        });
        for (a, b) in default.tools().iter().zip(all.tools()) {
            assert_eq!(a.name, b.name);
            assert!(count(&b.description, "**") >= count(&a.description, "**"));
            assert!(
                count(&b.description, EXAMPLE_RESPONSE_MARKER)
                    >= count(&a.description, EXAMPLE_RESPONSE_MARKER)
            );
        }
    }

    #[test]
    fn test_lookup_and_prepare() {
        let set = toolset(CompilerOptions::default());
        assert_eq!(set.tool_names().len(), 6);
        assert!(set.get("get_item").is_some());
        assert!(set.get("nope").is_none());

        let args = serde_json::json!({"item_id": 9}).as_object().cloned().unwrap();
        let request = set.prepare_request("delete_item", &args).unwrap();
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.url, "https://items.example.com/v1/items/9");

        let err = set.prepare_request("nope", &args).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn test_missing_success_status_propagates() {
        let doc = items_api();
        let mut operations = doc.operations().unwrap();
        operations[0].responses.retain(|r| !r.status.is_success());
        let err =
            ApiToolset::from_operations(doc.info(), None, operations, CompilerOptions::default())
                .unwrap_err();
        assert!(err.to_string().contains("list_items"));
    }
}
