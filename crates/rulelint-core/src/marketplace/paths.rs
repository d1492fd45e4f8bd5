//! Path checks for manifest fields
//!
//! Manifests are untrusted input. Every path they name must stay inside the
//! directory it is resolved against.

use serde_json::Value;

/// Relative, non-empty, and free of `..` anywhere (even inside a name such
/// as `a..b`, which is rejected too).
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('/') && !path.starts_with('~') && !path.contains("..")
}

/// Paths named by a manifest field: a string, or the strings of an array.
/// Other shapes (objects with inline server configs, numbers) name no paths.
pub fn extract_paths(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Join a plugin source under `metadata.pluginRoot`.
///
/// Empty and `.` segments are dropped; `..` segments are kept so the safety
/// check still sees them.
pub fn join_plugin_root(plugin_root: &str, source: &str) -> String {
    if plugin_root.is_empty() {
        return source.to_string();
    }

    let leading_slash = plugin_root.starts_with('/');
    let joined = plugin_root
        .split('/')
        .chain(source.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if leading_slash {
        format!("/{}", joined)
    } else {
        joined
    }
}
