use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::change::{Change, DiffResult, Severity};

/// Structural shape of a schema node, decided once before branching.
///
/// Classification is OR-based across both sides: a schema that dropped its
/// explicit `type: object` but still declares `properties` must still be
/// compared structurally.
enum SchemaShape {
    ObjectLike,
    ArrayLike,
    Opaque,
}

fn declared_type(schema: &Map<String, Value>) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

fn classify(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    old_type: Option<&str>,
    new_type: Option<&str>,
) -> SchemaShape {
    let object_like = old_type == Some("object")
        || new_type == Some("object")
        || old.contains_key("properties")
        || new.contains_key("properties")
        || old.contains_key("required")
        || new.contains_key("required");
    if object_like {
        return SchemaShape::ObjectLike;
    }

    let array_like = old_type == Some("array")
        || new_type == Some("array")
        || old.contains_key("items")
        || new.contains_key("items");
    if array_like {
        SchemaShape::ArrayLike
    } else {
        SchemaShape::Opaque
    }
}

/// JSON-Schema-shaped diff used inside OpenAPI request/response checks.
///
/// Breaking: type change, removed property, field becoming required.
/// Non-breaking: added property, field no longer required.
pub fn diff_schema(old: &Value, new: &Value, path: &str, result: &mut DiffResult) {
    let (Some(old_obj), Some(new_obj)) = (old.as_object(), new.as_object()) else {
        return;
    };

    let old_type = declared_type(old_obj);
    let new_type = declared_type(new_obj);

    // An explicit type mismatch subsumes any structural mismatch below.
    if let (Some(old_tag), Some(new_tag)) = (old_type, new_type) {
        if old_tag != new_tag {
            result.push(Change::type_change(
                path,
                old_tag,
                new_tag,
                "Schema type changed",
            ));
            return;
        }
    }

    match classify(old_obj, new_obj, old_type, new_type) {
        SchemaShape::ObjectLike => diff_object_schema(old_obj, new_obj, path, result),
        SchemaShape::ArrayLike => {
            let old_items = old_obj.get("items").filter(|items| items.is_object());
            let new_items = new_obj.get("items").filter(|items| items.is_object());
            if let (Some(old_items), Some(new_items)) = (old_items, new_items) {
                diff_schema(old_items, new_items, &format!("{path}.items"), result);
            }
        }
        SchemaShape::Opaque => {}
    }
}

fn diff_object_schema(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &str,
    result: &mut DiffResult,
) {
    let empty = Map::new();
    let old_props = old
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let new_props = new
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    for name in old_props.keys().filter(|k| !new_props.contains_key(*k)) {
        result.push(Change::removed_field(
            format!("{path}.properties.{name}"),
            "Property removed",
        ));
    }
    for name in new_props.keys().filter(|k| !old_props.contains_key(*k)) {
        result.push(Change::added_field(
            format!("{path}.properties.{name}"),
            "Property added",
        ));
    }

    let old_required = required_set(old);
    let new_required = required_set(new);

    for name in new_required.difference(&old_required) {
        result.push(Change::required_change(
            format!("{path}.required.{name}"),
            Severity::Breaking,
            "Field became required",
        ));
    }
    for name in old_required.difference(&new_required) {
        result.push(Change::required_change(
            format!("{path}.required.{name}"),
            Severity::NonBreaking,
            "Field is no longer required",
        ));
    }

    for (name, old_prop) in old_props {
        if let Some(new_prop) = new_props.get(name) {
            diff_schema(
                old_prop,
                new_prop,
                &format!("{path}.properties.{name}"),
                result,
            );
        }
    }
}

/// The `required` list as a set of names; non-list values count as empty.
fn required_set(schema: &Map<String, Value>) -> BTreeSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
