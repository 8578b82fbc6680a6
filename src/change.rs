use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    #[serde(rename = "breaking")]
    Breaking,
    #[serde(rename = "non_breaking")]
    NonBreaking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    #[serde(rename = "removed_field")]
    RemovedField,
    #[serde(rename = "added_field")]
    AddedField,
    #[serde(rename = "type_change")]
    TypeChange,
    #[serde(rename = "required_change")]
    RequiredChange,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::RemovedField => "removed_field",
            ChangeKind::AddedField => "added_field",
            ChangeKind::TypeChange => "type_change",
            ChangeKind::RequiredChange => "required_change",
        }
    }
}

/// A single detected difference between the old and the new document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub severity: Severity,
    pub path: String,
    pub old_type: Option<String>,
    pub new_type: Option<String>,
    pub message: Option<String>,
}

impl Change {
    /// Field/path/operation removal. Always breaking.
    pub fn removed_field(path: impl Into<String>, message: &str) -> Self {
        Self {
            kind: ChangeKind::RemovedField,
            severity: Severity::Breaking,
            path: path.into(),
            old_type: None,
            new_type: None,
            message: Some(message.to_owned()),
        }
    }

    /// Field/path/operation addition. Always non-breaking.
    pub fn added_field(path: impl Into<String>, message: &str) -> Self {
        Self {
            kind: ChangeKind::AddedField,
            severity: Severity::NonBreaking,
            path: path.into(),
            old_type: None,
            new_type: None,
            message: Some(message.to_owned()),
        }
    }

    /// Type tag mismatch. Always breaking; carries both tags.
    pub fn type_change(
        path: impl Into<String>,
        old_type: &str,
        new_type: &str,
        message: &str,
    ) -> Self {
        Self {
            kind: ChangeKind::TypeChange,
            severity: Severity::Breaking,
            path: path.into(),
            old_type: Some(old_type.to_owned()),
            new_type: Some(new_type.to_owned()),
            message: Some(message.to_owned()),
        }
    }

    /// Requiredness flip or required addition. Severity depends on direction.
    pub fn required_change(path: impl Into<String>, severity: Severity, message: &str) -> Self {
        Self {
            kind: ChangeKind::RequiredChange,
            severity,
            path: path.into(),
            old_type: None,
            new_type: None,
            message: Some(message.to_owned()),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.path)?;
        if let (Some(old), Some(new)) = (&self.old_type, &self.new_type) {
            write!(f, " ({old} -> {new})")?;
        }
        if let Some(message) = &self.message {
            write!(f, " - {message}")?;
        }
        Ok(())
    }
}

/// Accumulated diff between two documents, split by severity.
///
/// Built by a single traversal; ordering follows the sorted-key walk of the
/// compared trees.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct DiffResult {
    pub breaking: Vec<Change>,
    pub non_breaking: Vec<Change>,
}

impl DiffResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change to the list matching its severity.
    pub fn push(&mut self, change: Change) {
        match change.severity {
            Severity::Breaking => self.breaking.push(change),
            Severity::NonBreaking => self.non_breaking.push(change),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.breaking.is_empty() && self.non_breaking.is_empty()
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking.is_empty()
    }

    /// Exit code for CLI / CI usage.
    pub fn exit_code(&self) -> i32 {
        if self.has_breaking_changes() { 1 } else { 0 }
    }
}
