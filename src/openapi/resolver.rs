use serde_json::{Map, Value};

/// Reference chains longer than this are returned unresolved. Protects
/// against reference cycles without tracking visited nodes.
const MAX_DEPTH: usize = 20;

fn empty_schema() -> Value {
    Value::Object(Map::new())
}

/// Inline local `#/components/{schemas,parameters}` references in a schema
/// node, recursively.
///
/// The `$ref` marker is not preserved in the output. Unresolvable references
/// (missing target, unsupported bucket, non-object target) resolve to the
/// empty schema rather than failing the comparison.
pub fn resolve_schema(schema: &Value, doc: &Value) -> Value {
    resolve(schema, doc, 0)
}

fn resolve(schema: &Value, doc: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return if schema.is_object() {
            schema.clone()
        } else {
            empty_schema()
        };
    }

    let Some(obj) = schema.as_object() else {
        return empty_schema();
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        if reference.starts_with("#/components/") {
            return match lookup_components(reference, doc) {
                Some(target) if target.is_object() => resolve(target, doc, depth + 1),
                _ => empty_schema(),
            };
        }
    }

    let mut out = obj.clone();

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        let resolved: Map<String, Value> = props
            .iter()
            .map(|(key, prop)| {
                let prop = if prop.is_object() {
                    resolve(prop, doc, depth + 1)
                } else {
                    prop.clone()
                };
                (key.clone(), prop)
            })
            .collect();
        out.insert("properties".to_owned(), Value::Object(resolved));
    }

    if let Some(items) = obj.get("items") {
        if items.is_object() {
            out.insert("items".to_owned(), resolve(items, doc, depth + 1));
        }
    }

    for key in ["allOf", "oneOf", "anyOf"] {
        if let Some(variants) = obj.get(key).and_then(Value::as_array) {
            let resolved: Vec<Value> = variants
                .iter()
                .map(|variant| {
                    if variant.is_object() {
                        resolve(variant, doc, depth + 1)
                    } else {
                        variant.clone()
                    }
                })
                .collect();
            out.insert(key.to_owned(), Value::Array(resolved));
        }
    }

    Value::Object(out)
}

/// Looks up a `#/components/<bucket>/<Name>` target within the document.
/// Only the `schemas` and `parameters` buckets are supported.
fn lookup_components<'a>(reference: &str, doc: &'a Value) -> Option<&'a Value> {
    let parts: Vec<&str> = reference.split('/').collect();
    if parts.len() < 4 {
        return None;
    }
    let (bucket, name) = (parts[2], parts[3]);
    if bucket != "schemas" && bucket != "parameters" {
        return None;
    }
    doc.get("components")?.get(bucket)?.get(name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn inlines_schema_reference() {
        let doc = json!({
            "components": {
                "schemas": {
                    "User": {"type": "object", "properties": {"id": {"type": "integer"}}}
                }
            }
        });
        let schema = json!({"$ref": "#/components/schemas/User"});

        let resolved = resolve_schema(&schema, &doc);
        assert_eq!(resolved["type"], "object");
        assert_eq!(resolved["properties"]["id"]["type"], "integer");
        assert!(resolved.get("$ref").is_none());
    }

    #[test]
    fn resolves_refs_nested_in_properties_and_items() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Id": {"type": "integer"}
                }
            }
        });
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"$ref": "#/components/schemas/Id"},
                "ids": {"type": "array", "items": {"$ref": "#/components/schemas/Id"}}
            }
        });

        let resolved = resolve_schema(&schema, &doc);
        assert_eq!(resolved["properties"]["id"]["type"], "integer");
        assert_eq!(resolved["properties"]["ids"]["items"]["type"], "integer");
    }

    #[test]
    fn missing_target_resolves_to_empty_schema() {
        let doc = json!({"components": {"schemas": {}}});
        let schema = json!({"$ref": "#/components/schemas/Nope"});

        assert_eq!(resolve_schema(&schema, &doc), json!({}));
    }

    #[test]
    fn unsupported_bucket_resolves_to_empty_schema() {
        let doc = json!({
            "components": {"responses": {"NotFound": {"description": "missing"}}}
        });
        let schema = json!({"$ref": "#/components/responses/NotFound"});

        assert_eq!(resolve_schema(&schema, &doc), json!({}));
    }

    #[test]
    fn external_ref_is_left_in_place() {
        let doc = json!({});
        let schema = json!({"$ref": "https://example.com/schema.json"});

        let resolved = resolve_schema(&schema, &doc);
        assert_eq!(resolved["$ref"], "https://example.com/schema.json");
    }

    #[test]
    fn reference_cycle_stops_at_depth_bound() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {"next": {"$ref": "#/components/schemas/Node"}}
                    }
                }
            }
        });
        let schema = json!({"$ref": "#/components/schemas/Node"});

        // Must terminate; past the bound the node comes back verbatim.
        let resolved = resolve_schema(&schema, &doc);
        assert_eq!(resolved["type"], "object");
    }

    #[test]
    fn composition_elements_are_resolved() {
        let doc = json!({
            "components": {
                "schemas": {"Base": {"type": "object", "properties": {"id": {"type": "integer"}}}}
            }
        });
        let schema = json!({
            "allOf": [
                {"$ref": "#/components/schemas/Base"},
                {"type": "object", "properties": {"name": {"type": "string"}}}
            ]
        });

        let resolved = resolve_schema(&schema, &doc);
        assert_eq!(resolved["allOf"][0]["properties"]["id"]["type"], "integer");
        assert_eq!(resolved["allOf"][1]["properties"]["name"]["type"], "string");
    }
}
