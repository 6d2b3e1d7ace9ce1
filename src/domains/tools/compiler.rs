//! Tool compiler - turns operation descriptors into tool definitions.

use rmcp::{
    handler::server::tool::schema_for_type,
    model::{JsonObject, Tool},
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::config::CompilerConfig;
use super::description::Description;
use super::error::ToolError;
use super::input_schema::build_input_schema;
use super::naming::tool_name;
use super::request::PreparedRequest;
use crate::domains::openapi::OperationDescriptor;

/// A compiled tool: what MCP clients see in `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: JsonObject,
}

impl ToolDefinition {
    /// Convert to the rmcp tool model.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(self.input_schema.clone()),
            annotations: None,
            output_schema: Some(Arc::new(schema_for_type::<PreparedRequest>())),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// A tool definition paired with the operation it was compiled from.
#[derive(Debug, Clone)]
pub struct CompiledTool {
    pub definition: ToolDefinition,
    pub operation: OperationDescriptor,
}

/// Compiles operation descriptors under one configuration.
pub struct ToolCompiler<'a> {
    config: &'a CompilerConfig,
}

impl<'a> ToolCompiler<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    /// Compile a single operation under the given tool name.
    pub fn compile_operation(
        &self,
        name: &str,
        operation: &OperationDescriptor,
    ) -> Result<ToolDefinition, ToolError> {
        let description = Description::compose(name, operation, self.config)?;
        Ok(ToolDefinition {
            name: name.to_string(),
            description: description.render(),
            input_schema: build_input_schema(name, operation),
        })
    }

    /// Compile every operation, preserving order.
    ///
    /// Names are checked for uniqueness across the whole API before filters
    /// are applied; filtered-out operations are not compiled.
    #[instrument(skip_all, fields(operations = operations.len()))]
    pub fn compile(
        &self,
        operations: Vec<OperationDescriptor>,
    ) -> Result<Vec<CompiledTool>, ToolError> {
        let mut seen = HashSet::with_capacity(operations.len());
        let mut tools = Vec::with_capacity(operations.len());

        for operation in operations {
            let name = tool_name(&operation);
            if !seen.insert(name.clone()) {
                return Err(ToolError::DuplicateName(name));
            }
            if !self.config.filter().allows(&name, &operation.tags) {
                debug!(tool = %name, "Operation filtered out");
                continue;
            }

            let definition = self.compile_operation(&name, &operation)?;
            debug!(
                tool = %definition.name,
                method = %operation.method,
                path = %operation.path,
                "Compiled tool"
            );
            tools.push(CompiledTool {
                definition,
                operation,
            });
        }

        info!("Compiled {} tools", tools.len());
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::openapi::fixtures::items_api;
    use crate::domains::tools::config::CompilerOptions;

    fn compile(options: CompilerOptions) -> Result<Vec<CompiledTool>, ToolError> {
        let doc = items_api();
        let config = CompilerConfig::resolve(options, doc.info(), doc.default_server_url())?;
        ToolCompiler::new(&config).compile(doc.operations()?)
    }

    #[test]
    fn test_compile_all_operations_in_order() {
        let tools = compile(CompilerOptions::default()).unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.definition.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "list_items",
                "create_item",
                "get_item",
                "update_item",
                "delete_item",
                "get_health"
            ]
        );
        assert!(tools.iter().all(|t| !t.definition.description.is_empty()));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let doc = items_api();
        let config =
            CompilerConfig::resolve(CompilerOptions::default(), doc.info(), None).unwrap();
        let mut operations = doc.operations().unwrap();
        operations[1].operation_id = Some("list_items".to_string());

        let err = ToolCompiler::new(&config).compile(operations).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "list_items"));
    }

    #[test]
    fn test_filters_applied() {
        let tools = compile(CompilerOptions {
            include_operations: Some(vec!["get_item".to_string(), "delete_item".to_string()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tools.len(), 2);

        let tools = compile(CompilerOptions {
            exclude_tags: Some(vec!["items".to_string()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].definition.name, "get_health");
    }

    #[test]
    fn test_to_tool() {
        let tools = compile(CompilerOptions::default()).unwrap();
        let tool = tools[2].definition.to_tool();
        assert_eq!(tool.name, "get_item");
        assert!(tool.description.as_deref().unwrap().contains("**200**"));
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.output_schema.is_some());
    }
}
