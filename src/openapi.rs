use std::fmt;

use serde_json::Value;

use crate::change::{Change, DiffResult, Severity};

mod normalizer;
mod resolver;
mod schema;

pub use normalizer::{NormalizedOpenApi, OperationSchemas, ParameterSpec, normalize};

use schema::diff_schema;

/// The top-level document is structurally unusable. No partial result is
/// produced for these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDocument {
    PathsNotObject,
}

impl fmt::Display for InvalidDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDocument::PathsNotObject => write!(f, "OpenAPI 'paths' must be an object"),
        }
    }
}

impl std::error::Error for InvalidDocument {}

/// Compare two raw OpenAPI documents and classify every difference.
pub fn diff_openapi(old_raw: &Value, new_raw: &Value) -> Result<DiffResult, InvalidDocument> {
    let old = normalize(old_raw)?;
    let new = normalize(new_raw)?;

    let mut result = DiffResult::new();
    diff_paths(&old, &new, &mut result);
    for (op_key, old_op) in &old.operations {
        let Some(new_op) = new.operations.get(op_key) else {
            continue;
        };
        diff_parameters(op_key, old_op, new_op, &mut result);
        diff_request_body(op_key, old_op, new_op, &mut result);
        diff_responses(op_key, old_op, new_op, &mut result);
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Paths and operations
// ---------------------------------------------------------------------------

fn diff_paths(old: &NormalizedOpenApi, new: &NormalizedOpenApi, result: &mut DiffResult) {
    for path in old.paths.keys().filter(|p| !new.paths.contains_key(*p)) {
        result.push(Change::removed_field(format!("paths.{path}"), "Path removed"));
    }
    for path in new.paths.keys().filter(|p| !old.paths.contains_key(*p)) {
        result.push(Change::added_field(format!("paths.{path}"), "Path added"));
    }

    for (path, old_methods) in &old.paths {
        let Some(new_methods) = new.paths.get(path) else {
            continue;
        };
        for method in old_methods.difference(new_methods) {
            result.push(Change::removed_field(
                format!("paths.{path}.{method}"),
                "Operation removed",
            ));
        }
        for method in new_methods.difference(old_methods) {
            result.push(Change::added_field(
                format!("paths.{path}.{method}"),
                "Operation added",
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

fn parameter_path(op_key: &str, spec: &ParameterSpec) -> String {
    format!(
        "operations.{op_key}.parameters.{}.{}",
        spec.location, spec.name
    )
}

fn diff_parameters(
    op_key: &str,
    old_op: &OperationSchemas,
    new_op: &OperationSchemas,
    result: &mut DiffResult,
) {
    let old_params = &old_op.parameters;
    let new_params = &new_op.parameters;

    for (key, spec) in old_params {
        if !new_params.contains_key(key) {
            result.push(Change::removed_field(
                parameter_path(op_key, spec),
                "Parameter removed",
            ));
        }
    }

    for (key, spec) in new_params {
        if old_params.contains_key(key) {
            continue;
        }
        if spec.required {
            result.push(Change::required_change(
                parameter_path(op_key, spec),
                Severity::Breaking,
                "Required parameter added",
            ));
        } else {
            result.push(Change::added_field(
                parameter_path(op_key, spec),
                "Optional parameter added",
            ));
        }
    }

    for (key, old_spec) in old_params {
        let Some(new_spec) = new_params.get(key) else {
            continue;
        };
        let base = parameter_path(op_key, new_spec);

        if old_spec.required != new_spec.required {
            if new_spec.required {
                result.push(Change::required_change(
                    format!("{base}.required"),
                    Severity::Breaking,
                    "Parameter became required",
                ));
            } else {
                result.push(Change::required_change(
                    format!("{base}.required"),
                    Severity::NonBreaking,
                    "Parameter is no longer required",
                ));
            }
        }

        if let (Some(old_schema), Some(new_schema)) = (&old_spec.schema, &new_spec.schema) {
            diff_schema(old_schema, new_schema, &format!("{base}.schema"), result);
        }
    }
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

fn diff_request_body(
    op_key: &str,
    old_op: &OperationSchemas,
    new_op: &OperationSchemas,
    result: &mut DiffResult,
) {
    let path = format!("operations.{op_key}.requestBody");

    match (&old_op.request_schema, &new_op.request_schema) {
        (Some(_), None) => {
            result.push(Change::removed_field(path, "Request body removed"));
        }
        (None, Some(_)) => {
            if new_op.request_required {
                result.push(Change::required_change(
                    path,
                    Severity::Breaking,
                    "Required request body added",
                ));
            } else {
                result.push(Change::added_field(path, "Optional request body added"));
            }
        }
        (Some(old_schema), Some(new_schema)) => {
            diff_schema(old_schema, new_schema, &format!("{path}.schema"), result);

            if old_op.request_required != new_op.request_required {
                if new_op.request_required {
                    result.push(Change::required_change(
                        format!("{path}.required"),
                        Severity::Breaking,
                        "Request body became required",
                    ));
                } else {
                    result.push(Change::required_change(
                        format!("{path}.required"),
                        Severity::NonBreaking,
                        "Request body is no longer required",
                    ));
                }
            }
        }
        (None, None) => {}
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn diff_responses(
    op_key: &str,
    old_op: &OperationSchemas,
    new_op: &OperationSchemas,
    result: &mut DiffResult,
) {
    let old_resps = &old_op.responses;
    let new_resps = &new_op.responses;

    for status in old_resps.keys().filter(|s| !new_resps.contains_key(*s)) {
        result.push(Change::removed_field(
            format!("operations.{op_key}.responses.{status}"),
            "Response status removed",
        ));
    }
    for status in new_resps.keys().filter(|s| !old_resps.contains_key(*s)) {
        result.push(Change::added_field(
            format!("operations.{op_key}.responses.{status}"),
            "Response status added",
        ));
    }

    for (status, old_schema) in old_resps {
        let Some(new_schema) = new_resps.get(status) else {
            continue;
        };
        let schema_path = format!("operations.{op_key}.responses.{status}.schema");
        match (old_schema, new_schema) {
            (Some(_), None) => {
                result.push(Change::removed_field(schema_path, "Response schema removed"));
            }
            (None, Some(_)) => {
                result.push(Change::added_field(schema_path, "Response schema added"));
            }
            (Some(old_schema), Some(new_schema)) => {
                diff_schema(old_schema, new_schema, &schema_path, result);
            }
            (None, None) => {}
        }
    }
}
