//! Prepared HTTP requests.
//!
//! Calling a compiled tool resolves its arguments against the operation into
//! a concrete request description (method, URL, headers, body). The request
//! is handed back to the client as structured content; it is never sent.

use reqwest::Url;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::error::ToolError;
use super::input_schema::{body_argument, is_exposed_param};
use crate::domains::openapi::{OperationDescriptor, ParameterLocation};

/// A fully resolved HTTP request for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PreparedRequest {
    /// HTTP method, uppercase.
    pub method: String,
    /// Absolute URL including the query string.
    pub url: String,
    /// Header parameters supplied by the caller.
    pub headers: BTreeMap<String, String>,
    /// Media type of `body`, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// JSON request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Resolve `arguments` against `operation`, relative to `base_url`.
pub fn prepare_request(
    base_url: &str,
    operation: &OperationDescriptor,
    arguments: &JsonObject,
) -> Result<PreparedRequest, ToolError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ToolError::internal(format!("invalid base URL '{}': {}", base_url, e)))?;

    let segments = operation
        .path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| substitute_path_params(segment, operation, arguments))
        .collect::<Result<Vec<_>, _>>()?;
    url.path_segments_mut()
        .map_err(|_| ToolError::internal(format!("base URL '{}' cannot have a path", base_url)))?
        .pop_if_empty()
        .extend(&segments);
    if operation.path.ends_with('/') && !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|_| ToolError::internal("base URL cannot have a path"))?
            .push("");
    }

    let mut query = Vec::new();
    for param in operation.parameters_in(ParameterLocation::Query) {
        match arguments.get(&param.name) {
            Some(Value::Null) | None if param.required => {
                return Err(missing(&param.name));
            }
            Some(Value::Null) | None => {}
            // Arrays use the default `form` style with `explode: true`.
            Some(Value::Array(items)) => {
                for item in items {
                    query.push((param.name.as_str(), scalar_to_string(item)));
                }
            }
            Some(value) => query.push((param.name.as_str(), scalar_to_string(value))),
        }
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    let mut headers = BTreeMap::new();
    for param in operation.parameters_in(ParameterLocation::Header) {
        match arguments.get(&param.name) {
            Some(Value::Null) | None if param.required => return Err(missing(&param.name)),
            Some(Value::Null) | None => {}
            Some(value) => {
                headers.insert(param.name.clone(), scalar_to_string(value));
            }
        }
    }

    let (content_type, body) = match &operation.request_body {
        None => (None, None),
        Some(request_body) => {
            let body = collect_body(operation, arguments)?;
            if body.is_none() && request_body.required {
                return Err(ToolError::invalid_arguments("missing request body"));
            }
            (
                body.as_ref().map(|_| request_body.content_type.clone()),
                body,
            )
        }
    };

    Ok(PreparedRequest {
        method: operation.method.to_string(),
        url: url.to_string(),
        headers,
        content_type,
        body,
    })
}

/// Replace every `{name}` placeholder in one path segment.
fn substitute_path_params(
    segment: &str,
    operation: &OperationDescriptor,
    arguments: &JsonObject,
) -> Result<String, ToolError> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        out.push_str(&rest[..start]);
        match arguments.get(name) {
            Some(Value::Null) | None => {
                let declared = operation
                    .parameters_in(ParameterLocation::Path)
                    .any(|p| p.name == name);
                if !declared {
                    return Err(ToolError::internal(format!(
                        "path placeholder '{}' has no declared parameter",
                        name
                    )));
                }
                return Err(missing(name));
            }
            Some(value) => out.push_str(&scalar_to_string(value)),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    // Dot segments would be collapsed by URL normalization and address a
    // different resource.
    if out == "." || out == ".." {
        return Err(ToolError::invalid_arguments(format!(
            "path segment '{}' resolves to '{}', which is not allowed",
            segment, out
        )));
    }
    Ok(out)
}

/// Gather the request body from the arguments.
///
/// Object bodies were flattened into individual arguments by the input
/// schema; anything else travels under the argument named by [`body_argument`].
fn collect_body(
    operation: &OperationDescriptor,
    arguments: &JsonObject,
) -> Result<Option<Value>, ToolError> {
    let Some(request_body) = &operation.request_body else {
        return Ok(None);
    };
    let property_names = request_body.property_names();
    if property_names.is_empty() {
        let argument = body_argument(operation);
        return Ok(arguments.get(&argument).filter(|v| !v.is_null()).cloned());
    }

    let fields: Map<String, Value> = property_names
        .iter()
        .filter(|name| !is_exposed_param(operation, name))
        .filter_map(|name| arguments.get(*name).map(|v| (name.to_string(), v.clone())))
        .collect();

    if fields.is_empty() {
        return Ok(None);
    }

    let required: Vec<&str> = request_body
        .schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if let Some(absent) = required.iter().find(|name| !fields.contains_key(**name)) {
        return Err(missing(absent));
    }

    Ok(Some(Value::Object(fields)))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(name: &str) -> ToolError {
    ToolError::invalid_arguments(format!("missing required argument '{}'", name))
}
