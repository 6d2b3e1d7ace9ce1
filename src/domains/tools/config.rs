//! Compiler configuration.
//!
//! [`CompilerOptions`] is what users write (every field optional, all flags
//! off by default). [`CompilerConfig`] is the validated, immutable record the
//! compiler runs with: base URL normalized, name and description filled in
//! from the API's `info` object, filters checked for conflicts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::ToolError;
use crate::domains::openapi::ApiInfo;

/// Base URL used when neither the options nor the document provide one.
pub const FALLBACK_BASE_URL: &str = "http://localhost";

/// User-facing compiler options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Server name; defaults to the API title.
    pub name: Option<String>,

    /// Server description; defaults to the API description.
    pub description: Option<String>,

    /// Base URL requests are prepared against.
    pub base_url: Option<String>,

    /// Describe every documented status code, not only the success one.
    pub describe_all_responses: bool,

    /// Include the full output schema next to each example response.
    pub describe_full_response_schema: bool,

    /// Only expose these tools (by name).
    pub include_operations: Option<Vec<String>>,

    /// Expose every tool except these (by name).
    pub exclude_operations: Option<Vec<String>>,

    /// Only expose operations carrying one of these tags.
    pub include_tags: Option<Vec<String>>,

    /// Expose every operation except those carrying one of these tags.
    pub exclude_tags: Option<Vec<String>>,
}

/// Strip exactly one trailing `/` from a base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.strip_suffix('/').unwrap_or(raw).to_string()
}

/// Which operations become tools.
///
/// Each configured filter kind (by name, by tag) selects a set of operations;
/// an operation is kept when any configured kind selects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    operations: Option<Selection>,
    tags: Option<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Include(HashSet<String>),
    Exclude(HashSet<String>),
}

impl Selection {
    fn from_lists(
        kind: &str,
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    ) -> Result<Option<Self>, ToolError> {
        match (include, exclude) {
            (Some(_), Some(_)) => Err(ToolError::invalid_config(format!(
                "cannot both include and exclude {}",
                kind
            ))),
            (Some(include), None) => Ok(Some(Self::Include(include.into_iter().collect()))),
            (None, Some(exclude)) => Ok(Some(Self::Exclude(exclude.into_iter().collect()))),
            (None, None) => Ok(None),
        }
    }

    fn selects<'a>(&self, mut keys: impl Iterator<Item = &'a str>) -> bool {
        match self {
            Self::Include(set) => keys.any(|k| set.contains(k)),
            Self::Exclude(set) => !keys.any(|k| set.contains(k)),
        }
    }
}

impl OperationFilter {
    /// Whether the operation named `name` with the given tags is exposed.
    pub fn allows(&self, name: &str, tags: &[String]) -> bool {
        let by_name = self
            .operations
            .as_ref()
            .map(|s| s.selects(std::iter::once(name)));
        let by_tag = self
            .tags
            .as_ref()
            .map(|s| s.selects(tags.iter().map(String::as_str)));

        match (by_name, by_tag) {
            (None, None) => true,
            (Some(selected), None) | (None, Some(selected)) => selected,
            (Some(a), Some(b)) => a || b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_none() && self.tags.is_none()
    }
}

/// Immutable, validated compiler configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    name: String,
    description: Option<String>,
    base_url: String,
    describe_all_responses: bool,
    describe_full_response_schema: bool,
    filter: OperationFilter,
}

impl CompilerConfig {
    /// Resolve user options against the API's declared identity.
    ///
    /// `default_server` is the document's first absolute server URL, used when
    /// no base URL is configured.
    pub fn resolve(
        options: CompilerOptions,
        info: &ApiInfo,
        default_server: Option<&str>,
    ) -> Result<Self, ToolError> {
        let CompilerOptions {
            name,
            description,
            base_url,
            describe_all_responses,
            describe_full_response_schema,
            include_operations,
            exclude_operations,
            include_tags,
            exclude_tags,
        } = options;

        let base_url = base_url
            .as_deref()
            .or(default_server)
            .unwrap_or(FALLBACK_BASE_URL);

        Ok(Self {
            name: name.unwrap_or_else(|| info.title.clone()),
            description: description.or_else(|| info.description.clone()),
            base_url: normalize_base_url(base_url),
            describe_all_responses,
            describe_full_response_schema,
            filter: OperationFilter {
                operations: Selection::from_lists(
                    "operations",
                    include_operations,
                    exclude_operations,
                )?,
                tags: Selection::from_lists("tags", include_tags, exclude_tags)?,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn describe_all_responses(&self) -> bool {
        self.describe_all_responses
    }

    pub fn describe_full_response_schema(&self) -> bool {
        self.describe_full_response_schema
    }

    pub fn filter(&self) -> &OperationFilter {
        &self.filter
    }
}
