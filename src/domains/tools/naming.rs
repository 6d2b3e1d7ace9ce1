//! Tool name derivation.

use crate::domains::openapi::OperationDescriptor;

/// The tool name for an operation: its `operationId`, or `<method>_<path>`
/// with every non-alphanumeric run collapsed to one `_`.
pub fn tool_name(operation: &OperationDescriptor) -> String {
    match operation.operation_id.as_deref() {
        Some(id) => id.to_string(),
        None => sanitize(&format!("{}_{}", operation.method.as_str(), operation.path)),
    }
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
