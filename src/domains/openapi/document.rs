//! OpenAPI document model and operation extraction.
//!
//! The document is kept as raw JSON; [`OpenApiDocument::operations`] walks it
//! once and produces plain [`OperationDescriptor`] values.

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::descriptor::{
    HttpMethod, ModelRef, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    RequestBodyDescriptor, ResponseDescriptor, StatusCode,
};
use super::error::OpenApiError;
use super::refs::RefResolver;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// The API's declared identity (`info` object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// A parsed OpenAPI 3.x document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    raw: Value,
    info: ApiInfo,
    servers: Vec<String>,
}

impl OpenApiDocument {
    /// Validate and wrap a JSON value.
    pub fn from_value(raw: Value) -> Result<Self, OpenApiError> {
        let version = raw
            .get("openapi")
            .and_then(Value::as_str)
            .ok_or_else(|| OpenApiError::invalid("missing 'openapi' version field"))?;
        if !version.starts_with("3.") {
            return Err(OpenApiError::invalid(format!(
                "unsupported OpenAPI version '{}'",
                version
            )));
        }

        let info = raw
            .get("info")
            .ok_or_else(|| OpenApiError::invalid("missing 'info' object"))?;
        let info = ApiInfo {
            title: info
                .get("title")
                .and_then(Value::as_str)
                .ok_or_else(|| OpenApiError::invalid("missing 'info.title'"))?
                .to_string(),
            description: non_empty_str(info.get("description")),
            version: info
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };

        if let Some(paths) = raw.get("paths") {
            if !paths.is_object() {
                return Err(OpenApiError::invalid("'paths' must be an object"));
            }
        }

        let servers = raw
            .get("servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(|s| s.get("url").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { raw, info, servers })
    }

    /// Parse a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, OpenApiError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn info(&self) -> &ApiInfo {
        &self.info
    }

    /// Server URLs in declaration order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// The first declared server URL that is absolute.
    pub fn default_server_url(&self) -> Option<&str> {
        self.servers
            .iter()
            .map(String::as_str)
            .find(|url| url.starts_with("http://") || url.starts_with("https://"))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Extract every operation, paths in declaration order and methods in
    /// path-item field order.
    #[instrument(skip_all, fields(title = %self.info.title))]
    pub fn operations(&self) -> Result<Vec<OperationDescriptor>, OpenApiError> {
        let resolver = RefResolver::new(&self.raw);
        let mut operations = Vec::new();

        let Some(paths) = self.raw.get("paths").and_then(Value::as_object) else {
            return Ok(operations);
        };

        for (path, item) in paths {
            let item = resolver.shallow(item)?;
            let shared_params = item
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for method in HttpMethod::ALL {
                let Some(operation) = item.get(method.as_str()) else {
                    continue;
                };
                let descriptor =
                    extract_operation(&resolver, method, path, shared_params, operation)?;
                debug!(
                    method = %descriptor.method,
                    path = %descriptor.path,
                    responses = descriptor.responses.len(),
                    "Extracted operation"
                );
                operations.push(descriptor);
            }
        }

        Ok(operations)
    }
}

fn extract_operation<'a>(
    resolver: &RefResolver<'a>,
    method: HttpMethod,
    path: &str,
    shared_params: &'a [Value],
    operation: &'a Value,
) -> Result<OperationDescriptor, OpenApiError> {
    let tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let own_params = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    Ok(OperationDescriptor {
        method,
        path: path.to_string(),
        operation_id: non_empty_str(operation.get("operationId")),
        summary: non_empty_str(operation.get("summary")),
        description: non_empty_str(operation.get("description")),
        tags,
        parameters: extract_parameters(resolver, shared_params, own_params)?,
        request_body: extract_request_body(resolver, operation.get("requestBody"))?,
        responses: extract_responses(resolver, operation.get("responses"))?,
    })
}

/// Merge path-level and operation-level parameters; an operation parameter
/// replaces a path-level one with the same name and location.
fn extract_parameters<'a>(
    resolver: &RefResolver<'a>,
    shared: &'a [Value],
    own: &'a [Value],
) -> Result<Vec<ParameterDescriptor>, OpenApiError> {
    let mut merged: Vec<ParameterDescriptor> = Vec::new();

    for raw in shared.iter().chain(own) {
        let raw = resolver.shallow(raw)?;
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| OpenApiError::invalid("parameter without a name"))?;
        let location = raw
            .get("in")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .parse::<ParameterLocation>()
            .map_err(|e| OpenApiError::invalid(format!("parameter '{}': {}", name, e)))?;

        // Path parameters are always required by definition.
        let required = match location {
            ParameterLocation::Path => raw.get("required").and_then(Value::as_bool) != Some(false),
            _ => raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        };

        let schema = match raw.get("schema") {
            Some(schema) => resolver.resolve(schema)?,
            None => Value::Object(Map::new()),
        };

        let param = ParameterDescriptor {
            name: name.to_string(),
            location,
            required,
            description: non_empty_str(raw.get("description")),
            schema,
        };

        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }

    Ok(merged)
}

fn extract_request_body<'a>(
    resolver: &RefResolver<'a>,
    raw: Option<&'a Value>,
) -> Result<Option<RequestBodyDescriptor>, OpenApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = resolver.shallow(raw)?;
    let Some((content_type, media)) = raw
        .get("content")
        .and_then(Value::as_object)
        .and_then(select_media)
    else {
        return Ok(None);
    };

    let schema = match media.get("schema") {
        Some(schema) => resolver.resolve(schema)?,
        None => Value::Object(Map::new()),
    };

    Ok(Some(RequestBodyDescriptor {
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        content_type: content_type.to_string(),
        schema,
    }))
}

fn extract_responses<'a>(
    resolver: &RefResolver<'a>,
    raw: Option<&'a Value>,
) -> Result<Vec<ResponseDescriptor>, OpenApiError> {
    let Some(raw) = raw.and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut responses = Vec::with_capacity(raw.len());
    for (key, response) in raw {
        let Some(status) = StatusCode::parse(key) else {
            warn!("Ignoring response with invalid status key '{}'", key);
            continue;
        };
        if responses.iter().any(|r: &ResponseDescriptor| r.status == status) {
            warn!("Ignoring response '{}': status {} is already declared", key, status);
            continue;
        }
        let response = resolver.shallow(response)?;
        let description = response
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let media = response
            .get("content")
            .and_then(Value::as_object)
            .and_then(select_media);

        let mut descriptor = ResponseDescriptor {
            status,
            description,
            content_type: None,
            schema: None,
            example: None,
            model: None,
        };

        if let Some((content_type, media)) = media {
            descriptor.content_type = Some(content_type.to_string());
            if let Some(schema) = media.get("schema") {
                descriptor.model = model_ref(schema);
                descriptor.schema = Some(resolver.resolve(schema)?);
            }
            descriptor.example = media_example(resolver, media)?;
        }

        responses.push(descriptor);
    }

    Ok(responses)
}

/// Pick the media type to describe: `application/json`, then any JSON
/// flavour, then whatever is declared first.
fn select_media(content: &Map<String, Value>) -> Option<(&str, &Value)> {
    content
        .get_key_value("application/json")
        .or_else(|| content.iter().find(|(ct, _)| ct.contains("json")))
        .or_else(|| content.iter().next())
        .map(|(ct, media)| (ct.as_str(), media))
}

/// Documented example on a media type object: `example` first, then the
/// first entry of `examples`.
fn media_example<'a>(
    resolver: &RefResolver<'a>,
    media: &'a Value,
) -> Result<Option<Value>, OpenApiError> {
    if let Some(example) = media.get("example") {
        return resolver.resolve(example).map(Some);
    }
    let Some((_, first)) = media
        .get("examples")
        .and_then(Value::as_object)
        .and_then(|examples| examples.iter().next())
    else {
        return Ok(None);
    };
    let first = resolver.shallow(first)?;
    match first.get("value") {
        Some(value) => resolver.resolve(value).map(Some),
        None => Ok(None),
    }
}

fn model_ref(schema: &Value) -> Option<ModelRef> {
    let component = |value: &Value| {
        value
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
            .map(str::to_string)
    };

    if let Some(name) = component(schema) {
        return Some(ModelRef::Single(name));
    }
    if schema.get("type").and_then(Value::as_str) == Some("array") {
        return schema.get("items").and_then(component).map(ModelRef::ListOf);
    }
    None
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
