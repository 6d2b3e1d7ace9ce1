//! Example payload synthesis from JSON schemas.
//!
//! Used when a response documents a schema but no example. Synthesis never
//! fails: shapes it does not understand become `{}`.

use serde_json::{Map, Value, json};

const MAX_DEPTH: usize = 8;

/// Build a representative value for `schema`.
pub fn synthesize(schema: &Value) -> Value {
    synthesize_at(schema, 0)
}

fn synthesize_at(schema: &Value, depth: usize) -> Value {
    let Some(map) = schema.as_object() else {
        return Value::Object(Map::new());
    };
    if depth > MAX_DEPTH {
        return Value::Null;
    }

    if let Some(example) = map.get("example") {
        return example.clone();
    }
    if let Some(first) = map
        .get("examples")
        .and_then(Value::as_array)
        .and_then(|examples| examples.first())
    {
        return first.clone();
    }
    for key in ["default", "const"] {
        if let Some(value) = map.get(key) {
            return value.clone();
        }
    }
    if let Some(first) = map
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|variants| variants.first())
    {
        return first.clone();
    }

    if let Some(parts) = map.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        for part in parts {
            match synthesize_at(part, depth + 1) {
                Value::Object(fields) => merged.extend(fields),
                other if parts.len() == 1 => return other,
                _ => {}
            }
        }
        return Value::Object(merged);
    }

    for key in ["anyOf", "oneOf"] {
        if let Some(alternatives) = map.get(key).and_then(Value::as_array) {
            let chosen = alternatives
                .iter()
                .find(|alt| schema_type(alt) != Some("null"))
                .or_else(|| alternatives.first());
            return match chosen {
                Some(alt) => synthesize_at(alt, depth + 1),
                None => Value::Null,
            };
        }
    }

    match schema_type(schema) {
        Some("object") => synthesize_object(map, depth),
        Some("array") => {
            let item = map
                .get("items")
                .map(|items| synthesize_at(items, depth + 1))
                .unwrap_or(Value::Null);
            Value::Array(vec![item])
        }
        Some("string") => synthesize_string(map.get("format").and_then(Value::as_str)),
        Some("integer") => json!(0),
        Some("number") => json!(0.0),
        Some("boolean") => json!(true),
        Some("null") => Value::Null,
        _ if map.contains_key("properties") => synthesize_object(map, depth),
        _ => Value::Object(Map::new()),
    }
}

fn synthesize_object(map: &Map<String, Value>, depth: usize) -> Value {
    let mut out = Map::new();
    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            out.insert(name.clone(), synthesize_at(property, depth + 1));
        }
    }
    if let Some(extra) = map.get("additionalProperties").filter(|v| v.is_object()) {
        out.insert("additionalProp1".to_string(), synthesize_at(extra, depth + 1));
    }
    Value::Object(out)
}

fn synthesize_string(format: Option<&str>) -> Value {
    let sample = match format {
        Some("date-time") => "2024-01-01T00:00:00Z",
        Some("date") => "2024-01-01",
        Some("time") => "00:00:00",
        Some("email") => "user@example.com",
        Some("uri") | Some("url") => "https://example.com",
        Some("uuid") => "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        _ => "string",
    };
    Value::String(sample.to_string())
}

/// The declared type, taking the first non-null entry of a type array.
fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null")
            .or_else(|| types.iter().find_map(Value::as_str)),
        _ => None,
    }
}
