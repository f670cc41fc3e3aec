//! Internal `$ref` resolution for Swagger 2.0 / OpenAPI 3.x documents.

use serde_json::{json, Map, Value};
use tracing::warn;

pub const ORIGINAL_REF_KEY: &str = "_originalRef";
pub const CIRCULAR_REF_KEY: &str = "_circularRef";

/// Return a copy of `document` with every internal `$ref` replaced by its target.
///
/// A reference that appears again while its own target is being expanded is
/// replaced by a circular-reference placeholder, so recursive models such as
/// a category tree terminate. External and dangling references become
/// unresolved placeholders. Every substituted object records the reference it
/// came from under `_originalRef`.
pub fn resolve_refs(document: &Value) -> Value {
    let mut stack = Vec::new();
    resolve_value(document, document, &mut stack)
}

fn resolve_value(root: &Value, current: &Value, stack: &mut Vec<String>) -> Value {
    match current {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(root, item, stack))
                .collect(),
        ),
        Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
            Some(reference) => resolve_reference(root, reference, stack),
            None => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, value) in map {
                    let value = if key == ORIGINAL_REF_KEY || key == CIRCULAR_REF_KEY {
                        value.clone()
                    } else {
                        resolve_value(root, value, stack)
                    };
                    resolved.insert(key.clone(), value);
                }
                Value::Object(resolved)
            }
        },
        other => other.clone(),
    }
}

fn resolve_reference(root: &Value, reference: &str, stack: &mut Vec<String>) -> Value {
    if stack.iter().any(|seen| seen == reference) {
        warn!(
            reference = %reference,
            path = %stack.join(" -> "),
            "Circular reference detected"
        );
        return json!({
            "type": "object",
            "description": format!("Circular reference to {}", reference),
            CIRCULAR_REF_KEY: true,
            ORIGINAL_REF_KEY: reference,
        });
    }

    let Some(target) = lookup(root, reference) else {
        return json!({
            "type": "object",
            "description": format!("Unresolved reference: {}", reference),
            ORIGINAL_REF_KEY: reference,
        });
    };

    stack.push(reference.to_string());
    let mut resolved = resolve_value(root, target, stack);
    stack.pop();

    if let Value::Object(map) = &mut resolved {
        map.insert(ORIGINAL_REF_KEY.to_string(), Value::String(reference.to_string()));
    }
    resolved
}

/// Follow a `#/a/b/c` JSON pointer. External references are not followed.
fn lookup<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let Some(pointer) = reference.strip_prefix("#/") else {
        warn!(reference = %reference, "External references are not supported");
        return None;
    };

    let mut current = root;
    for segment in pointer.split('/') {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .or_else(|| {
            warn!(reference = %reference, "Reference not found");
            None
        })?;
    }
    Some(current)
}

/// Human-readable type for a parameter or schema: `string (date-time)`,
/// `array of string`, `string - one of [A, B]`.
pub fn type_description(param: &Value) -> String {
    let mut description = param
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("any")
        .to_string();

    if let Some(format) = param.get("format").and_then(Value::as_str) {
        description.push_str(&format!(" ({})", format));
    }

    if description == "array" {
        if let Some(items) = param.get("items") {
            let item_type = items.get("type").and_then(Value::as_str).unwrap_or("any");
            description = format!("array of {}", item_type);
        }
    }

    if let Some(values) = param.get("enum").and_then(Value::as_array) {
        let values: Vec<String> = values.iter().map(display_scalar).collect();
        description.push_str(&format!(" - one of [{}]", values.join(", ")));
    }

    description
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
