//! Diagnostic types and error reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type LintResult<T> = Result<T, LintError>;

/// One failed check against a rule file.
///
/// `rule_id` is absent when the failure happened before the rule could be
/// identified (read or parse failures). The message is final, human-facing
/// text and is never matched on programmatically by the tool itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(file: &str, rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            rule_id: Some(rule_id.to_string()),
            message: message.into(),
        }
    }

    /// Error for a file whose rule id is not known yet.
    pub fn for_file(file: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            rule_id: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule_id {
            Some(id) => write!(f, "{} [{}]: {}", self.file, id, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A finding from marketplace/plugin manifest validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDiagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl ManifestDiagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }
}

/// Linter errors
///
/// These are infrastructure failures (I/O, malformed config, unparseable
/// frontmatter). Content problems in a rule are reported as
/// [`ValidationError`] values instead.
#[derive(Error, Debug)]
pub enum LintError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to read symlink: {path}")]
    FileSymlink { path: PathBuf },

    #[error("Not a regular file: {path}")]
    FileNotRegular { path: PathBuf },

    #[error("File too large: {path} ({size} bytes, limit {limit})")]
    FileTooBig { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid YAML frontmatter: {source}")]
    YamlParse {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No section prefix matches file name '{file}'")]
    UnknownSection { file: String },

    #[error("Unknown skill: {name}. Available skills: {}", .available.join(", "))]
    UnknownSkill {
        name: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
