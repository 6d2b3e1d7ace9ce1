//! Plain operation descriptors.
//!
//! One [`OperationDescriptor`] is extracted per (path, method) pair of the
//! document. Every `$ref` inside a descriptor is already resolved, so the tool
//! compiler never needs to look back at the source document.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP methods an OpenAPI path item can declare operations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Methods in the order they appear as fields of an OpenAPI path item.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// The lowercase field name used in path items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Where a parameter is carried in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(format!("unknown parameter location '{}'", other)),
        }
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    /// Resolved JSON schema of the parameter value (`{}` when undeclared).
    pub schema: Value,
}

/// The request body of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyDescriptor {
    pub required: bool,
    pub content_type: String,
    /// Resolved JSON schema of the body.
    pub schema: Value,
}

impl RequestBodyDescriptor {
    /// Property names when the body is an object schema.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A response key of an operation's `responses` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// An explicit code such as `200`.
    Code(u16),
    /// A range such as `2XX`; holds the leading digit.
    Range(u8),
    /// The `default` catch-all response.
    Default,
}

impl StatusCode {
    /// Parse a response key. Returns `None` for keys OpenAPI does not allow.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("default") {
            return Some(Self::Default);
        }
        let bytes = raw.as_bytes();
        if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
            return None;
        }
        if raw[1..].eq_ignore_ascii_case("xx") {
            return Some(Self::Range(bytes[0] - b'0'));
        }
        raw.parse::<u16>().ok().map(Self::Code)
    }

    /// Whether this key describes a successful (2xx) outcome.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Code(code) => (200..300).contains(code),
            Self::Range(class) => *class == 2,
            Self::Default => false,
        }
    }

    // Ranges sort right after the explicit codes of their class start,
    // `default` sorts last.
    fn sort_key(&self) -> (u16, u8) {
        match self {
            Self::Code(code) => (*code, 0),
            Self::Range(class) => (u16::from(*class) * 100, 1),
            Self::Default => (u16::MAX, 2),
        }
    }
}

impl Ord for StatusCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for StatusCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Range(class) => write!(f, "{}XX", class),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Named component a response body refers to, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    /// The body is a single `#/components/schemas/<name>`.
    Single(String),
    /// The body is an array of `#/components/schemas/<name>`.
    ListOf(String),
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::ListOf(name) => write!(f, "List of {}", name),
        }
    }
}

/// One documented response of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: StatusCode,
    pub description: String,
    pub content_type: Option<String>,
    /// Resolved body schema, if the response declares content.
    pub schema: Option<Value>,
    /// Example payload documented on the media type.
    pub example: Option<Value>,
    pub model: Option<ModelRef>,
}

impl ResponseDescriptor {
    /// Whether the response carries a body worth describing.
    ///
    /// A missing schema, `null` or `{}` all count as "no body".
    pub fn has_body(&self) -> bool {
        match &self.schema {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Schema metadata for one API route.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<RequestBodyDescriptor>,
    /// Responses in declaration order.
    pub responses: Vec<ResponseDescriptor>,
}

impl OperationDescriptor {
    /// The response representing the operation's intended success outcome.
    ///
    /// The first declared explicit 2xx code wins; a `2XX` range is used only
    /// when no explicit success code exists.
    pub fn primary_response(&self) -> Option<&ResponseDescriptor> {
        self.responses
            .iter()
            .find(|r| matches!(r.status, StatusCode::Code(_)) && r.status.is_success())
            .or_else(|| self.responses.iter().find(|r| r.status.is_success()))
    }

    /// Parameters declared at the given location, in declaration order.
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: &str, schema: Option<Value>) -> ResponseDescriptor {
        ResponseDescriptor {
            status: StatusCode::parse(status).unwrap(),
            description: String::new(),
            content_type: schema.as_ref().map(|_| "application/json".to_string()),
            schema,
            example: None,
            model: None,
        }
    }

    fn operation(responses: Vec<ResponseDescriptor>) -> OperationDescriptor {
        OperationDescriptor {
            method: HttpMethod::Get,
            path: "/things".to_string(),
            operation_id: None,
            summary: None,
            description: None,
            tags: vec![],
            parameters: vec![],
            request_body: None,
            responses,
        }
    }

    #[test]
    fn test_status_code_parse() {
        assert_eq!(StatusCode::parse("200"), Some(StatusCode::Code(200)));
        assert_eq!(StatusCode::parse("2XX"), Some(StatusCode::Range(2)));
        assert_eq!(StatusCode::parse("4xx"), Some(StatusCode::Range(4)));
        assert_eq!(StatusCode::parse("default"), Some(StatusCode::Default));
        assert_eq!(StatusCode::parse("20"), None);
        assert_eq!(StatusCode::parse("600"), None);
        assert_eq!(StatusCode::parse("ok"), None);
    }

    #[test]
    fn test_status_code_ordering() {
        let mut codes = vec![
            StatusCode::Default,
            StatusCode::Code(422),
            StatusCode::Range(2),
            StatusCode::Code(204),
            StatusCode::Code(200),
        ];
        codes.sort();
        assert_eq!(
            codes,
            vec![
                StatusCode::Code(200),
                StatusCode::Range(2),
                StatusCode::Code(204),
                StatusCode::Code(422),
                StatusCode::Default,
            ]
        );
    }

    #[test]
    fn test_primary_response_first_declared() {
        let op = operation(vec![
            response("422", Some(json!({"type": "object"}))),
            response("201", Some(json!({"type": "object"}))),
            response("200", Some(json!({"type": "object"}))),
        ]);
        assert_eq!(op.primary_response().unwrap().status, StatusCode::Code(201));
    }

    #[test]
    fn test_primary_response_range_fallback() {
        let op = operation(vec![response("2XX", None), response("default", None)]);
        assert_eq!(op.primary_response().unwrap().status, StatusCode::Range(2));

        let op = operation(vec![response("404", None)]);
        assert!(op.primary_response().is_none());
    }

    #[test]
    fn test_has_body() {
        assert!(!response("204", None).has_body());
        assert!(!response("200", Some(json!({}))).has_body());
        assert!(response("200", Some(json!({"type": "string"}))).has_body());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Delete.as_str(), "delete");
    }
}
