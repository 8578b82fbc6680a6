use serde_json::json;

use super::*;
use crate::change::{ChangeKind, Severity};

#[test]
fn no_changes_for_identical_trees() {
    let old = json!({"User": {"age": 30}, "tags": [1, 2, 3]});
    let new = json!({"User": {"age": 30}, "tags": [1, 2, 3]});

    let result = diff_values(&old, &new);
    assert!(result.is_empty());
    assert!(!result.has_breaking_changes());
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn removed_field_is_breaking() {
    let old = json!({"User": {"email": "a@b.com", "age": 30}});
    let new = json!({"User": {"age": 30}});

    let result = diff_values(&old, &new);
    assert!(result.has_breaking_changes());
    assert_eq!(result.exit_code(), 1);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].kind, ChangeKind::RemovedField);
    assert_eq!(result.breaking[0].path, "User.email");
}

#[test]
fn added_field_is_non_breaking() {
    let old = json!({"a": 1});
    let new = json!({"a": 1, "b": 2});

    let result = diff_values(&old, &new);
    assert!(result.breaking.is_empty());
    assert_eq!(result.non_breaking.len(), 1);
    assert_eq!(result.non_breaking[0].kind, ChangeKind::AddedField);
    assert_eq!(result.non_breaking[0].severity, Severity::NonBreaking);
    assert_eq!(result.non_breaking[0].path, "b");
}

#[test]
fn removed_nested_field_path() {
    let old = json!({"a": {"x": 1}});
    let new = json!({"a": {}});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert!(result.non_breaking.is_empty());
    assert_eq!(result.breaking[0].kind, ChangeKind::RemovedField);
    assert_eq!(result.breaking[0].path, "a.x");
}

#[test]
fn type_change_is_breaking() {
    let old = json!({"n": 1});
    let new = json!({"n": "1"});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    let change = &result.breaking[0];
    assert_eq!(change.kind, ChangeKind::TypeChange);
    assert_eq!(change.path, "n");
    assert_eq!(change.old_type.as_deref(), Some("number"));
    assert_eq!(change.new_type.as_deref(), Some("string"));
}

#[test]
fn type_change_nested() {
    let old = json!({"Order": {"amount": 12.5}});
    let new = json!({"Order": {"amount": "12.5"}});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].path, "Order.amount");
    assert_eq!(result.breaking[0].new_type.as_deref(), Some("string"));
}

#[test]
fn type_change_at_root_uses_dollar_path() {
    let old = json!({"a": 1});
    let new = json!([1]);

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].path, "$");
    assert_eq!(result.breaking[0].old_type.as_deref(), Some("object"));
    assert_eq!(result.breaking[0].new_type.as_deref(), Some("array"));
}

#[test]
fn type_change_stops_recursion() {
    // The object under "a" differs too, but the type change at "a" subsumes it.
    let old = json!({"a": {"x": 1}});
    let new = json!({"a": [1]});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].path, "a");
}

#[test]
fn list_first_element_type_change_is_breaking() {
    let old = json!({"items": [{"id": 1}]});
    let new = json!({"items": ["oops"]});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].kind, ChangeKind::TypeChange);
    assert_eq!(result.breaking[0].path, "items[]");
}

#[test]
fn list_first_element_field_removal() {
    let old = json!({"users": [{"id": 1, "name": "a"}]});
    let new = json!({"users": [{"id": 1}]});

    let result = diff_values(&old, &new);
    assert_eq!(result.breaking.len(), 1);
    assert_eq!(result.breaking[0].path, "users[].name");
}

#[test]
fn empty_list_on_either_side_produces_no_change() {
    let old = json!({"xs": []});
    let new = json!({"xs": [1, 2]});
    assert!(diff_values(&old, &new).is_empty());

    let old = json!({"xs": [1]});
    let new = json!({"xs": []});
    assert!(diff_values(&old, &new).is_empty());
}

#[test]
fn field_presence_is_symmetric() {
    let old = json!({"User": {"email": "a@b.com", "age": 30}});
    let new = json!({"User": {"age": 30}});

    let forward = diff_values(&old, &new);
    let backward = diff_values(&new, &old);

    assert_eq!(forward.breaking.len(), 1);
    assert_eq!(forward.breaking[0].kind, ChangeKind::RemovedField);
    assert_eq!(backward.non_breaking.len(), 1);
    assert_eq!(backward.non_breaking[0].kind, ChangeKind::AddedField);
    assert_eq!(forward.breaking[0].path, backward.non_breaking[0].path);
}

#[test]
fn removals_are_emitted_in_sorted_key_order() {
    let old = json!({"z": 1, "a": 2, "m": 3});
    let new = json!({});

    let result = diff_values(&old, &new);
    let paths: Vec<&str> = result.breaking.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["a", "m", "z"]);
}

#[test]
fn result_serializes_to_canonical_shape() {
    let old = json!({"n": 1, "gone": true});
    let new = json!({"n": "1"});

    let result = diff_values(&old, &new);
    let payload = serde_json::to_value(&result).unwrap();

    let breaking = payload["breaking"].as_array().unwrap();
    assert_eq!(breaking.len(), 2);

    let removed = &breaking[0];
    assert_eq!(removed["type"], "removed_field");
    assert_eq!(removed["severity"], "breaking");
    assert_eq!(removed["path"], "gone");
    assert!(removed["old_type"].is_null());
    assert!(removed["new_type"].is_null());
    assert_eq!(removed["message"], "Field removed");

    let type_change = &breaking[1];
    assert_eq!(type_change["type"], "type_change");
    assert_eq!(type_change["old_type"], "number");
    assert_eq!(type_change["new_type"], "string");

    assert_eq!(payload["non_breaking"], json!([]));
}
