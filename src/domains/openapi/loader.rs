//! Loading OpenAPI documents from disk or over HTTP.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument};

use super::document::OpenApiDocument;
use super::error::OpenApiError;

/// Where to read the OpenAPI document from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum DocumentSource {
    /// A JSON file on the local filesystem.
    File(PathBuf),
    /// An `http(s)://` URL serving the JSON document.
    Url(String),
}

impl DocumentSource {
    /// Interpret a user-supplied string: anything with an http(s) scheme is a
    /// URL, everything else a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Url(url) => write!(f, "url {}", url),
        }
    }
}

/// Read and validate the document behind `source`.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_document(source: &DocumentSource) -> Result<OpenApiDocument, OpenApiError> {
    let raw: Value = match source {
        DocumentSource::File(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| OpenApiError::Read {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_str(&text)?
        }
        DocumentSource::Url(url) => {
            let fetch_error = |source| OpenApiError::Fetch {
                url: url.clone(),
                source,
            };
            reqwest::get(url)
                .await
                .and_then(|response| response.error_for_status())
                .map_err(fetch_error)?
                .json()
                .await
                .map_err(fetch_error)?
        }
    };

    let document = OpenApiDocument::from_value(raw)?;
    info!(
        "Loaded OpenAPI document '{}' v{}",
        document.info().title,
        document.info().version
    );
    Ok(document)
}
