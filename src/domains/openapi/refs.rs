//! Local `$ref` resolution.
//!
//! Only same-document references (`#/...`) are supported. A reference that is
//! already being expanded further up the stack is left in place, which is how
//! recursive models (trees, linked lists) stay finite.
//!
//! Fully expanded targets are cached per resolver, so a component reused
//! across many schemas is expanded once. Expansions that had to cut a cycle
//! depend on where they were reached from and are not cached.

use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::error::OpenApiError;

const MAX_REF_DEPTH: usize = 32;

/// Resolves `$ref`s against the root of an OpenAPI document.
pub struct RefResolver<'a> {
    root: &'a Value,
    expanded: RefCell<HashMap<String, Value>>,
    cuts: Cell<usize>,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            expanded: RefCell::new(HashMap::new()),
            cuts: Cell::new(0),
        }
    }

    /// Look up the target of a single reference without expanding it.
    pub fn lookup(&self, reference: &str) -> Result<&'a Value, OpenApiError> {
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| OpenApiError::unresolved(reference))?;
        self.root
            .pointer(pointer)
            .ok_or_else(|| OpenApiError::unresolved(reference))
    }

    /// Follow a top-level `$ref` chain (e.g. a response or parameter object
    /// that is itself a reference) without touching nested references.
    pub fn shallow(&self, value: &'a Value) -> Result<&'a Value, OpenApiError> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            match current.get("$ref").and_then(Value::as_str) {
                Some(reference) => current = self.lookup(reference)?,
                None => return Ok(current),
            }
        }
        Ok(current)
    }

    /// Return a copy of `value` with every resolvable reference expanded.
    pub fn resolve(&self, value: &Value) -> Result<Value, OpenApiError> {
        self.resolve_inner(value, &mut Vec::new())
    }

    fn resolve_inner(&self, value: &Value, stack: &mut Vec<String>) -> Result<Value, OpenApiError> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if stack.len() >= MAX_REF_DEPTH || stack.iter().any(|r| r == reference) {
                        self.cuts.set(self.cuts.get() + 1);
                        return Ok(value.clone());
                    }
                    stack.push(reference.to_string());
                    let mut resolved = self.expand_target(reference, stack)?;
                    // Sibling keywords next to $ref override the target's.
                    if let Value::Object(resolved_map) = &mut resolved {
                        for (key, sibling) in map.iter().filter(|(k, _)| k.as_str() != "$ref") {
                            resolved_map.insert(key.clone(), self.resolve_inner(sibling, stack)?);
                        }
                    }
                    stack.pop();
                    return Ok(resolved);
                }

                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.resolve_inner(child, stack)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_inner(item, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn expand_target(&self, reference: &str, stack: &mut Vec<String>) -> Result<Value, OpenApiError> {
        if let Some(cached) = self.expanded.borrow().get(reference) {
            return Ok(cached.clone());
        }
        let target = self.lookup(reference)?;
        let cuts_before = self.cuts.get();
        let resolved = self.resolve_inner(target, stack)?;
        if self.cuts.get() == cuts_before {
            self.expanded
                .borrow_mut()
                .insert(reference.to_string(), resolved.clone());
        }
        Ok(resolved)
    }

    /// Number of references whose expansion is cached.
    pub fn cached_targets(&self) -> usize {
        self.expanded.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "components": {
                "schemas": {
                    "Item": {
                        "type": "object",
                        "properties": {
                            "owner": {"$ref": "#/components/schemas/User"}
                        }
                    },
                    "User": {"type": "object", "properties": {"name": {"type": "string"}}},
                    "Node": {
                        "type": "object",
                        "properties": {"next": {"$ref": "#/components/schemas/Node"}}
                    },
                    "a~b/c": {"type": "integer"}
                }
            }
        })
    }

    #[test]
    fn test_resolve_nested() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let resolved = resolver
            .resolve(&json!({"$ref": "#/components/schemas/Item"}))
            .unwrap();
        assert_eq!(
            resolved["properties"]["owner"]["properties"]["name"]["type"],
            "string"
        );
    }

    #[test]
    fn test_resolve_cycle_is_cut() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let resolved = resolver
            .resolve(&json!({"$ref": "#/components/schemas/Node"}))
            .unwrap();
        assert_eq!(
            resolved["properties"]["next"]["$ref"],
            "#/components/schemas/Node"
        );
    }

    #[test]
    fn test_shared_components_expanded_once() {
        // Each level refers to the next one twice: a DAG, not a cycle.
        let mut schemas = Map::new();
        for level in 0..12 {
            let next = json!({"$ref": format!("#/components/schemas/L{}", level + 1)});
            schemas.insert(
                format!("L{}", level),
                json!({"type": "object", "properties": {"left": next, "right": next}}),
            );
        }
        schemas.insert("L12".to_string(), json!({"type": "string"}));
        let doc = json!({"components": {"schemas": schemas}});

        let resolver = RefResolver::new(&doc);
        let resolved = resolver
            .resolve(&json!({"$ref": "#/components/schemas/L0"}))
            .unwrap();
        assert_eq!(resolver.cached_targets(), 13);
        let mut leaf = &resolved;
        for _ in 0..12 {
            leaf = &leaf["properties"]["right"];
        }
        assert_eq!(leaf["type"], "string");
    }

    #[test]
    fn test_cycle_cut_is_not_cached() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        resolver
            .resolve(&json!({"$ref": "#/components/schemas/Node"}))
            .unwrap();
        assert_eq!(resolver.cached_targets(), 0);

        let resolved = resolver
            .resolve(&json!({"properties": {"n": {"$ref": "#/components/schemas/Node"}}}))
            .unwrap();
        assert_eq!(
            resolved["properties"]["n"]["properties"]["next"]["$ref"],
            "#/components/schemas/Node"
        );
    }

    #[test]
    fn test_resolve_escaped_pointer() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let resolved = resolver
            .resolve(&json!({"$ref": "#/components/schemas/a~0b~1c"}))
            .unwrap();
        assert_eq!(resolved["type"], "integer");
    }

    #[test]
    fn test_sibling_keywords_override() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let resolved = resolver
            .resolve(&json!({"$ref": "#/components/schemas/User", "description": "Owner"}))
            .unwrap();
        assert_eq!(resolved["description"], "Owner");
        assert_eq!(resolved["type"], "object");
    }

    #[test]
    fn test_missing_reference() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let err = resolver
            .resolve(&json!({"$ref": "#/components/schemas/Missing"}))
            .unwrap_err();
        assert!(matches!(err, OpenApiError::UnresolvedReference(_)));

        let err = resolver.lookup("other.json#/Item").unwrap_err();
        assert!(matches!(err, OpenApiError::UnresolvedReference(_)));
    }
}
