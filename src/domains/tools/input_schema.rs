//! Input schema derivation.
//!
//! Path, query and header parameters plus the request body are merged into one
//! flat JSON-Schema object, which is what MCP clients fill in when calling a
//! tool. Cookie parameters are not exposed.

use rmcp::model::JsonObject;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domains::openapi::{OperationDescriptor, ParameterLocation};

/// Preferred argument name when the request body is not an object.
pub const BODY_ARGUMENT: &str = "body";

/// Parameter locations that become tool arguments.
pub const EXPOSED_LOCATIONS: [ParameterLocation; 3] = [
    ParameterLocation::Path,
    ParameterLocation::Query,
    ParameterLocation::Header,
];

/// Whether `name` is taken by a parameter exposed as a tool argument.
pub fn is_exposed_param(operation: &OperationDescriptor, name: &str) -> bool {
    operation
        .parameters
        .iter()
        .any(|p| p.name == name && EXPOSED_LOCATIONS.contains(&p.location))
}

/// Argument carrying a non-object request body: `body`, or `body_<n>` with
/// the smallest `n` that no exposed parameter already uses.
pub fn body_argument(operation: &OperationDescriptor) -> String {
    if !is_exposed_param(operation, BODY_ARGUMENT) {
        return BODY_ARGUMENT.to_string();
    }
    (1..)
        .map(|n| format!("{}_{}", BODY_ARGUMENT, n))
        .find(|candidate| !is_exposed_param(operation, candidate))
        .unwrap_or_default()
}

/// Build the `inputSchema` of the tool named `tool_name`.
pub fn build_input_schema(tool_name: &str, operation: &OperationDescriptor) -> JsonObject {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for location in EXPOSED_LOCATIONS {
        for param in operation.parameters_in(location) {
            let mut schema = match &param.schema {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            };
            schema.insert("title".to_string(), Value::String(param.name.clone()));
            if let Some(description) = &param.description {
                schema.insert("description".to_string(), Value::String(description.clone()));
            }
            if !schema.contains_key("type") && !is_composite(&schema) {
                schema.insert("type".to_string(), Value::String("string".to_string()));
            }
            properties.insert(param.name.clone(), Value::Object(schema));
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
    }

    if let Some(body) = &operation.request_body {
        match body.schema.get("properties").and_then(Value::as_object) {
            Some(body_props) => {
                let body_required: Vec<&str> = body
                    .schema
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();

                for (name, schema) in body_props {
                    if properties.contains_key(name) {
                        warn!(
                            tool = tool_name,
                            "Body property '{}' shadows a parameter and is not exposed", name
                        );
                        continue;
                    }
                    properties.insert(name.clone(), schema.clone());
                    if body.required && body_required.contains(&name.as_str()) {
                        required.push(Value::String(name.clone()));
                    }
                }
            }
            None => {
                let argument = body_argument(operation);
                if argument != BODY_ARGUMENT {
                    warn!(
                        tool = tool_name,
                        "A parameter is named '{}'; request body exposed as '{}'",
                        BODY_ARGUMENT,
                        argument
                    );
                }
                properties.insert(argument.clone(), body.schema.clone());
                if body.required {
                    required.push(Value::String(argument));
                }
            }
        }
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("title".to_string(), Value::String(format!("{}Arguments", tool_name)));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema
}

fn is_composite(schema: &Map<String, Value>) -> bool {
    ["anyOf", "oneOf", "allOf", "$ref"]
        .iter()
        .any(|key| schema.contains_key(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::openapi::fixtures::items_api;
    use serde_json::json;

    fn operation(id: &str) -> OperationDescriptor {
        items_api()
            .operations()
            .unwrap()
            .into_iter()
            .find(|op| op.operation_id.as_deref() == Some(id))
            .unwrap()
    }

    #[test]
    fn test_query_parameters_optional() {
        let schema = build_input_schema("list_items", &operation("list_items"));
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["title"], "list_itemsArguments");
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["skip", "limit", "sort_by"]);
        assert_eq!(props["skip"]["type"], "integer");
        assert_eq!(props["skip"]["default"], 0);
        assert_eq!(props["skip"]["title"], "skip");
        assert_eq!(props["limit"]["description"], "Max number of items to return");
        // anyOf keeps its own typing
        assert!(props["sort_by"].get("type").is_none());
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_path_parameter_and_body_merge() {
        let schema = build_input_schema("update_item", &operation("update_item"));
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(
            props.keys().collect::<Vec<_>>(),
            vec!["item_id", "id", "name", "description", "price", "tags"]
        );
        assert_eq!(props["item_id"]["type"], "integer");
        assert_eq!(
            schema["required"],
            json!(["item_id", "id", "name", "price"])
        );
    }

    #[test]
    fn test_scalar_body_exposed_as_body_argument() {
        let mut op = operation("create_item");
        if let Some(body) = op.request_body.as_mut() {
            body.schema = json!({"type": "array", "items": {"type": "string"}});
        }
        let schema = build_input_schema("create_item", &op);
        assert_eq!(schema["properties"]["body"]["type"], "array");
        assert_eq!(schema["required"], json!(["body"]));
    }

    #[test]
    fn test_body_argument_avoids_parameter_names() {
        let mut op = operation("create_item");
        if let Some(body) = op.request_body.as_mut() {
            body.schema = json!({"type": "array", "items": {"type": "string"}});
        }
        let mut param = operation("list_items").parameters[0].clone();
        param.name = "body".to_string();
        param.required = true;
        param.schema = json!({"type": "string"});
        op.parameters.push(param);

        assert_eq!(body_argument(&op), "body_1");
        let schema = build_input_schema("create_item", &op);
        assert_eq!(schema["properties"]["body"]["type"], "string");
        assert_eq!(schema["properties"]["body_1"]["type"], "array");
        assert_eq!(schema["required"], json!(["body", "body_1"]));
    }

    #[test]
    fn test_cookie_parameters_do_not_shadow_body_properties() {
        let mut op = operation("update_item");
        let mut cookie = op.parameters[0].clone();
        cookie.name = "name".to_string();
        cookie.location = ParameterLocation::Cookie;
        op.parameters.push(cookie);

        assert!(!is_exposed_param(&op, "name"));
        assert!(is_exposed_param(&op, "item_id"));
        let schema = build_input_schema("update_item", &op);
        assert_eq!(schema["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_untyped_parameter_defaults_to_string() {
        let mut op = operation("get_item");
        op.parameters[0].schema = json!({});
        let schema = build_input_schema("get_item", &op);
        assert_eq!(schema["properties"]["item_id"]["type"], "string");
    }

    #[test]
    fn test_cookie_parameters_hidden() {
        let mut op = operation("get_item");
        let mut cookie = op.parameters[0].clone();
        cookie.name = "session".to_string();
        cookie.location = ParameterLocation::Cookie;
        op.parameters.push(cookie);
        let schema = build_input_schema("get_item", &op);
        assert!(schema["properties"].get("session").is_none());
    }
}
