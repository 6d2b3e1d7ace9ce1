//! Tool description composition.
//!
//! A description is built as an ordered list of typed sections and rendered
//! to markdown at the end. Every status subsection renders exactly one
//! `**<code>**` marker, and at most one `**Example Response:**` and one
//! `**Output Schema:**` marker, so marker counts follow directly from the
//! section list.

use serde_json::Value;
use std::fmt;

use super::config::CompilerConfig;
use super::error::ToolError;
use crate::domains::openapi::{
    ModelRef, OperationDescriptor, ResponseDescriptor, StatusCode, example,
};

pub const EXAMPLE_RESPONSE_MARKER: &str = "**Example Response:**";
pub const OUTPUT_SCHEMA_MARKER: &str = "**Output Schema:**";

/// The literal marker heading a status code's subsection.
pub fn status_marker(status: StatusCode) -> String {
    format!("**{}**", status)
}

/// One block of a tool description.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionSection {
    /// Operation summary, or `METHOD path` when none is declared.
    Summary(String),
    /// Free-text operation description.
    Details(String),
    /// Heading introducing the status subsections.
    ResponsesHeading,
    /// One selected status code.
    Response(ResponseSection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSection {
    pub status: StatusCode,
    pub description: String,
    pub primary: bool,
    pub model: Option<ModelRef>,
    /// Present only when the response has a body.
    pub body: Option<ResponseBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    pub example: Value,
    /// Present only when full response schemas are requested.
    pub schema: Option<Value>,
}

/// A composed tool description.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    sections: Vec<DescriptionSection>,
}

impl Description {
    /// Compose the description of `operation` under `config`.
    pub fn compose(
        tool_name: &str,
        operation: &OperationDescriptor,
        config: &CompilerConfig,
    ) -> Result<Self, ToolError> {
        let primary = operation
            .primary_response()
            .ok_or_else(|| ToolError::missing_success_status(tool_name))?;

        let mut sections = vec![DescriptionSection::Summary(
            operation
                .summary
                .clone()
                .unwrap_or_else(|| format!("{} {}", operation.method, operation.path)),
        )];
        if let Some(details) = &operation.description {
            sections.push(DescriptionSection::Details(details.clone()));
        }

        let mut selected: Vec<&ResponseDescriptor> = if config.describe_all_responses() {
            operation.responses.iter().collect()
        } else {
            vec![primary]
        };
        selected.sort_by_key(|response| response.status);

        sections.push(DescriptionSection::ResponsesHeading);
        for response in selected {
            sections.push(DescriptionSection::Response(ResponseSection {
                status: response.status,
                description: response.description.clone(),
                primary: response.status == primary.status,
                model: response.model.clone(),
                body: response_body(response, config.describe_full_response_schema()),
            }));
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[DescriptionSection] {
        &self.sections
    }

    /// Status codes listed, in rendering order.
    pub fn statuses(&self) -> impl Iterator<Item = StatusCode> + '_ {
        self.sections.iter().filter_map(|section| match section {
            DescriptionSection::Response(response) => Some(response.status),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn response_body(response: &ResponseDescriptor, full_schema: bool) -> Option<ResponseBody> {
    if !response.has_body() {
        return None;
    }
    let schema = response.schema.as_ref()?;
    Some(ResponseBody {
        example: response
            .example
            .clone()
            .unwrap_or_else(|| example::synthesize(schema)),
        schema: full_schema.then(|| schema.clone()),
    })
}

fn write_json_block(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
    write!(f, "```json\n{}\n```", pretty)
}

impl fmt::Display for ResponseSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", status_marker(self.status))?;
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        if self.primary {
            f.write_str(" (Success Response)")?;
        }

        let Some(body) = &self.body else {
            return Ok(());
        };
        if let Some(model) = &self.model {
            write!(f, "\nModel: {}", model)?;
        }
        write!(f, "\n\n{}\n", EXAMPLE_RESPONSE_MARKER)?;
        write_json_block(f, &body.example)?;
        if let Some(schema) = &body.schema {
            write!(f, "\n\n{}\n", OUTPUT_SCHEMA_MARKER)?;
            write_json_block(f, schema)?;
        }
        Ok(())
    }
}

impl fmt::Display for DescriptionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary(text) | Self::Details(text) => f.write_str(text),
            Self::ResponsesHeading => f.write_str("### Responses:"),
            Self::Response(response) => write!(f, "{}", response),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}
