//! Shared test fixtures.

use super::document::OpenApiDocument;

/// Raw JSON of a small items API, shaped like a FastAPI export.
pub const ITEMS_API_JSON: &str = include_str!("testdata/items_api.json");

/// The items API as a parsed document.
pub fn items_api() -> OpenApiDocument {
    OpenApiDocument::from_json_str(ITEMS_API_JSON).expect("fixture document is valid")
}
