//! YAML frontmatter parser

use crate::diagnostics::{LintError, LintResult};
use serde::de::DeserializeOwned;

/// Parse YAML frontmatter from markdown content
///
/// Expects content in format:
/// ```markdown
/// ---
/// key: value
/// ---
/// body content
/// ```
///
/// A file without frontmatter deserializes `T` from an empty document, so
/// `T` should tolerate missing keys (all-`Option` structs with `Default`).
pub fn parse_frontmatter<T: DeserializeOwned + Default>(content: &str) -> LintResult<(T, String)> {
    let parts = split_frontmatter(content);
    let parsed: T = if parts.frontmatter.trim().is_empty() {
        T::default()
    } else {
        serde_yaml::from_str(&parts.frontmatter).map_err(|source| LintError::YamlParse { source })?
    };
    Ok((parsed, parts.body.trim_start().to_string()))
}

/// Frontmatter and body split out of a document, with byte offsets into the
/// original content.
#[derive(Debug, Clone)]
pub struct FrontmatterParts {
    pub has_frontmatter: bool,
    pub has_closing: bool,
    pub frontmatter: String,
    pub body: String,
    pub body_start: usize,
}

/// Split frontmatter and body from content.
pub fn split_frontmatter(content: &str) -> FrontmatterParts {
    let trimmed = content.trim_start();
    let trim_offset = content.len() - trimmed.len();

    if !trimmed.starts_with("---") {
        return FrontmatterParts {
            has_frontmatter: false,
            has_closing: false,
            frontmatter: String::new(),
            body: trimmed.to_string(),
            body_start: trim_offset,
        };
    }

    let rest = &trimmed[3..];
    let frontmatter_start = trim_offset + 3;

    if let Some(end_pos) = rest.find("\n---") {
        let frontmatter = rest[..end_pos].trim_end_matches('\r');
        // Skip "\n---" and the remainder of the closing marker line
        let after_marker = &rest[end_pos + 4..];
        let line_end = after_marker.find('\n').map_or(after_marker.len(), |i| i + 1);
        FrontmatterParts {
            has_frontmatter: true,
            has_closing: true,
            frontmatter: frontmatter.to_string(),
            body: after_marker[line_end..].to_string(),
            body_start: frontmatter_start + end_pos + 4 + line_end,
        }
    } else {
        // No closing marker - treat entire file as body
        FrontmatterParts {
            has_frontmatter: true,
            has_closing: false,
            frontmatter: String::new(),
            body: rest.to_string(),
            body_start: frontmatter_start,
        }
    }
}
