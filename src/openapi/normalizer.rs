use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::InvalidDocument;
use super::resolver::resolve_schema;

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "patch", "head", "options", "trace",
];

/// A parameter as seen by the comparison, keyed by `location:name`.
///
/// `name` keeps the original casing for display; the identity key lowercases
/// header names, since HTTP header matching is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub location: String,
    pub required: bool,
    pub schema: Option<Value>,
}

impl ParameterSpec {
    pub fn identity_key(&self) -> String {
        let key_name = if self.location == "header" {
            self.name.to_lowercase()
        } else {
            self.name.clone()
        };
        format!("{}:{}", self.location, key_name)
    }
}

/// Everything the comparison needs to know about one operation.
///
/// A response status maps to `None` when it declares no JSON body contract;
/// an absent status key means the status itself does not exist.
#[derive(Debug, Default)]
pub struct OperationSchemas {
    pub request_required: bool,
    pub request_schema: Option<Value>,
    pub responses: BTreeMap<String, Option<Value>>,
    pub parameters: BTreeMap<String, ParameterSpec>,
}

/// Canonical, reference-resolved model of an OpenAPI document.
#[derive(Debug, Default)]
pub struct NormalizedOpenApi {
    /// path -> set of lowercase HTTP methods present under it
    pub paths: BTreeMap<String, BTreeSet<String>>,
    /// "METHOD path" -> operation details
    pub operations: BTreeMap<String, OperationSchemas>,
}

/// Flattens a raw OpenAPI document into a [`NormalizedOpenApi`].
///
/// Fails only when `paths` is present but not object-shaped; every other
/// malformed fragment is treated as absent.
pub fn normalize(raw: &Value) -> Result<NormalizedOpenApi, InvalidDocument> {
    let paths_raw = match raw.get("paths") {
        None | Some(Value::Null) => return Ok(NormalizedOpenApi::default()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(InvalidDocument::PathsNotObject),
    };

    let mut normalized = NormalizedOpenApi::default();

    for (path, path_item) in paths_raw {
        let Some(item) = path_item.as_object() else {
            continue;
        };

        // Path-item-level parameters apply to every operation under the path.
        let base_params = parse_parameters(item.get("parameters"), raw);

        let mut methods = BTreeSet::new();

        for (key, op) in item {
            let method = key.to_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let Some(op_obj) = op.as_object() else {
                continue;
            };

            let op_key = format!("{} {}", method.to_uppercase(), path);
            methods.insert(method);

            // Operation-level parameters win on identity-key collision.
            let mut parameters = base_params.clone();
            parameters.extend(parse_parameters(op_obj.get("parameters"), raw));

            let mut request_required = false;
            let mut request_schema = None;
            if let Some(body) = op_obj.get("requestBody").and_then(Value::as_object) {
                request_required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
                request_schema = media_json_schema(body.get("content"), raw);
            }

            let mut responses = BTreeMap::new();
            if let Some(resps) = op_obj.get("responses").and_then(Value::as_object) {
                for (status, resp) in resps {
                    let Some(resp_obj) = resp.as_object() else {
                        continue;
                    };
                    let schema = media_json_schema(resp_obj.get("content"), raw);
                    responses.insert(status.clone(), schema);
                }
            }

            normalized.operations.insert(
                op_key,
                OperationSchemas {
                    request_required,
                    request_schema,
                    responses,
                    parameters,
                },
            );
        }

        normalized.paths.insert(path.clone(), methods);
    }

    Ok(normalized)
}

/// Extracts and resolves the `application/json` schema from a `content`
/// mapping. Other media types are ignored.
fn media_json_schema(content: Option<&Value>, doc: &Value) -> Option<Value> {
    content?
        .get("application/json")?
        .get("schema")
        .filter(|schema| schema.is_object())
        .map(|schema| resolve_schema(schema, doc))
}

/// Parses an OpenAPI parameter list, best-effort.
///
/// Entries may be local `$ref`s (resolved before extraction). Only
/// query/path/header locations are recognized; cookie parameters are
/// ignored. Entries without a string `name` and `in` are skipped.
fn parse_parameters(params: Option<&Value>, doc: &Value) -> BTreeMap<String, ParameterSpec> {
    let mut out = BTreeMap::new();
    let Some(entries) = params.and_then(Value::as_array) else {
        return out;
    };

    for entry in entries {
        let resolved;
        let param = match entry.as_object() {
            Some(obj) if obj.contains_key("$ref") => {
                resolved = resolve_schema(entry, doc);
                match resolved.as_object() {
                    Some(obj) => obj,
                    None => continue,
                }
            }
            Some(obj) => obj,
            None => continue,
        };

        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let Some(location) = param.get("in").and_then(Value::as_str) else {
            continue;
        };
        let location = location.to_lowercase();
        if !matches!(location.as_str(), "query" | "path" | "header") {
            continue;
        }

        let required = param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let schema = param
            .get("schema")
            .filter(|schema| schema.is_object())
            .map(|schema| resolve_schema(schema, doc));

        let spec = ParameterSpec {
            name: name.to_owned(),
            location,
            required,
            schema,
        };
        out.insert(spec.identity_key(), spec);
    }

    out
}
