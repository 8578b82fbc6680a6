use serde_json::Value;

use crate::change::{Change, DiffResult};

/// Runtime type tag of a JSON value, as reported in `type_change` entries.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

/// Deterministic diff of two nested JSON-like trees.
///
/// Removed fields and type changes are breaking; added fields are
/// non-breaking. Arrays are compared through their first element only.
pub fn diff_values(old: &Value, new: &Value) -> DiffResult {
    let mut result = DiffResult::new();
    diff_node(old, new, "", &mut result);
    result
}

fn diff_node(old: &Value, new: &Value, path: &str, result: &mut DiffResult) {
    let old_type = type_name(old);
    let new_type = type_name(new);

    // A type mismatch subsumes any structural difference below this node.
    if old_type != new_type {
        let at = if path.is_empty() { "$" } else { path };
        result.push(Change::type_change(at, old_type, new_type, "Type changed"));
        return;
    }

    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            // Key iteration is lexically sorted (BTree-backed map), which
            // keeps the emission order deterministic.
            for key in old_map.keys().filter(|k| !new_map.contains_key(*k)) {
                result.push(Change::removed_field(child_path(path, key), "Field removed"));
            }
            for key in new_map.keys().filter(|k| !old_map.contains_key(*k)) {
                result.push(Change::added_field(child_path(path, key), "Field added"));
            }
            for (key, old_child) in old_map {
                if let Some(new_child) = new_map.get(key) {
                    diff_node(old_child, new_child, &child_path(path, key), result);
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            // Representative-element rule: only the first elements are
            // compared. Length and per-index differences are out of scope.
            if let (Some(old_first), Some(new_first)) = (old_items.first(), new_items.first()) {
                let element_path = if path.is_empty() {
                    "[]".to_owned()
                } else {
                    format!("{path}[]")
                };
                diff_node(old_first, new_first, &element_path, result);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests;
