use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

#[derive(Debug)]
pub enum ParseError {
    Yaml(serde_yml::Error),
    Json(serde_json::Error),
    NotAnObject,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Yaml(e) => write!(f, "invalid YAML: {e}"),
            ParseError::Json(e) => write!(f, "invalid JSON: {e}"),
            ParseError::NotAnObject => write!(f, "top-level value must be an object"),
        }
    }
}

type LoadErrorPath = String;

#[derive(Debug)]
pub enum LoadError {
    Io(LoadErrorPath, std::io::Error),
    Parse(LoadErrorPath, ParseError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(path, e) => write!(f, "failed to read '{path}': {e}"),
            LoadError::Parse(path, e) => write!(f, "failed to parse '{path}': {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// What kind of contract a document looks like, detected from its top-level
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    OpenApi,
    JsonSchema,
    Unknown,
}

impl SchemaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::OpenApi => "openapi",
            SchemaKind::JsonSchema => "json_schema",
            SchemaKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed document tree plus its detected kind.
#[derive(Debug)]
pub struct LoadedSchema {
    pub kind: SchemaKind,
    pub raw: Value,
    pub source: PathBuf,
}

enum Format {
    Json,
    Yaml,
}

fn detect_format(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(Format::Json),
        Some("yaml" | "yml") => Some(Format::Yaml),
        _ => None,
    }
}

fn parse_content(content: &str, format: Format) -> Result<Value, ParseError> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(ParseError::Json),
        Format::Yaml => serde_yml::from_str(content).map_err(ParseError::Yaml),
    }
}

fn parse_unknown_content(content: &str) -> Result<Value, ParseError> {
    parse_content(content, Format::Json).or_else(|_| parse_content(content, Format::Yaml))
}

fn parse_content_auto(content: &str, format: Option<Format>) -> Result<Value, ParseError> {
    match format {
        Some(f) => parse_content(content, f),
        None => parse_unknown_content(content),
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    let path_str = path.display().to_string();
    std::fs::read_to_string(path).map_err(|e| LoadError::Io(path_str, e))
}

/// Detect whether a document looks like OpenAPI 3.x, JSON Schema, or neither.
pub fn detect_kind(raw: &Value) -> SchemaKind {
    const JSON_SCHEMA_MARKERS: [&str; 8] = [
        "type",
        "properties",
        "required",
        "allOf",
        "oneOf",
        "anyOf",
        "$defs",
        "definitions",
    ];

    let Some(obj) = raw.as_object() else {
        return SchemaKind::Unknown;
    };

    if obj.contains_key("openapi") && obj.contains_key("paths") {
        return SchemaKind::OpenApi;
    }
    if obj.contains_key("$schema") || JSON_SCHEMA_MARKERS.iter().any(|k| obj.contains_key(*k)) {
        return SchemaKind::JsonSchema;
    }
    SchemaKind::Unknown
}

/// Load a schema file from disk (JSON or YAML) and detect its kind.
///
/// Non-object top-level values are rejected here, before the core ever sees
/// the document.
pub fn load_file(path: &Path) -> Result<LoadedSchema, LoadError> {
    let path_str = path.display().to_string();
    let content = read_file(path)?;
    let format = detect_format(path);

    let raw =
        parse_content_auto(&content, format).map_err(|e| LoadError::Parse(path_str.clone(), e))?;
    if !raw.is_object() {
        return Err(LoadError::Parse(path_str, ParseError::NotAnObject));
    }

    Ok(LoadedSchema {
        kind: detect_kind(&raw),
        raw,
        source: path.to_path_buf(),
    })
}
