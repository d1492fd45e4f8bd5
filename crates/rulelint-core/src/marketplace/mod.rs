//! Plugin marketplace validation
//!
//! Checks `<root>/.claude-plugin/marketplace.json` (or `.cursor-plugin`) and
//! every plugin it lists: naming, source directories, the plugin's own
//! `plugin.json`, and the paths that manifest references. Cursor
//! marketplaces may nest plugins under `metadata.pluginRoot` and also get
//! their `skills/*/SKILL.md` frontmatter checked.
//!
//! Every problem is a [`ManifestDiagnostic`]; nothing here returns `Err`.
//! Structural failures (missing or unparseable marketplace, empty plugin
//! list) end the run early, and a broken plugin entry skips the rest of that
//! plugin's checks.

pub mod paths;

use crate::{
    diagnostics::{LintError, ManifestDiagnostic},
    file_utils::{read_json, safe_read_file},
    parsers::frontmatter::split_frontmatter,
    regex_util::static_regex,
};
use paths::{extract_paths, is_safe_relative_path, join_plugin_root};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

static_regex!(fn marketplace_name, r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$");
static_regex!(fn plugin_name, r"^[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?$");

const PLUGIN_NAME_RULE: &str =
    "name must match pattern /^[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?$/ (lowercase, hyphens, periods)";

/// plugin.json fields that name files or directories inside the plugin
const PATH_FIELDS: &[&str] = &[
    "skills",
    "commands",
    "agents",
    "hooks",
    "mcpServers",
    "lspServers",
];

/// Which tool's marketplace layout to check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginFlavor {
    Claude,
    Cursor,
}

impl PluginFlavor {
    /// Manifest directory, both at the marketplace root and in each plugin
    pub fn manifest_dir(self) -> &'static str {
        match self {
            PluginFlavor::Claude => ".claude-plugin",
            PluginFlavor::Cursor => ".cursor-plugin",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PluginFlavor::Claude => "Claude",
            PluginFlavor::Cursor => "Cursor",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PluginFlavor::Claude => "claude",
            PluginFlavor::Cursor => "cursor",
        }
    }
}

impl fmt::Display for PluginFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors and warnings from one marketplace run, each in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketplaceReport {
    pub errors: Vec<ManifestDiagnostic>,
    pub warnings: Vec<ManifestDiagnostic>,
}

impl MarketplaceReport {
    /// Warnings never fail a run.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ManifestDiagnostic::error(message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(ManifestDiagnostic::warning(message));
    }
}

/// JSON truthiness: null, false, 0 and "" are absent.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Render a manifest value the way it appears in messages
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A present name, rendered as text. Numbers count as names.
fn name_text(value: Option<&Value>) -> Option<String> {
    value.filter(|_| is_present(value)).map(display_value)
}

fn read_manifest(path: &Path, report: &mut MarketplaceReport) -> Option<Value> {
    match read_json::<Value>(path) {
        Ok(value) => Some(value),
        Err(LintError::JsonParse { source, .. }) => {
            report.error(format!("Failed to parse {}: {}", path.display(), source));
            None
        }
        Err(e) => {
            report.error(format!("Failed to parse {}: {}", path.display(), e));
            None
        }
    }
}

/// Validate the marketplace under `root`.
pub fn validate_marketplace(root: &Path, flavor: PluginFlavor) -> MarketplaceReport {
    let mut report = MarketplaceReport::default();
    let manifest_path = root.join(flavor.manifest_dir()).join("marketplace.json");

    tracing::debug!(flavor = %flavor, path = %manifest_path.display(), "validating marketplace");

    if !manifest_path.exists() {
        report.error(format!(
            "Marketplace manifest not found: {}",
            manifest_path.display()
        ));
        return report;
    }

    let Some(marketplace) = read_manifest(&manifest_path, &mut report) else {
        return report;
    };

    match name_text(marketplace.get("name")) {
        None => report.error("marketplace.json: missing 'name' field"),
        Some(name) if !marketplace_name().is_match(&name) => report.error(format!(
            "marketplace.json: name '{}' must be lowercase kebab-case",
            name
        )),
        Some(_) => {}
    }

    if !is_present(marketplace.get("owner").and_then(|o| o.get("name"))) {
        report.error("marketplace.json: missing 'owner.name' field");
    }

    let plugins = match marketplace.get("plugins").and_then(Value::as_array) {
        Some(plugins) if !plugins.is_empty() => plugins,
        _ => {
            report.error("marketplace.json: 'plugins' must be a non-empty array");
            return report;
        }
    };

    let mut seen = HashSet::new();
    for name in plugins.iter().filter_map(|p| name_text(p.get("name"))) {
        if !seen.insert(name.clone()) {
            report.error(format!("marketplace.json: duplicate plugin name '{}'", name));
        }
    }

    let metadata = marketplace.get("metadata");
    let plugin_root = match flavor {
        PluginFlavor::Claude => "",
        PluginFlavor::Cursor => {
            non_empty_str(metadata.and_then(|m| m.get("pluginRoot"))).unwrap_or("")
        }
    };

    for entry in plugins {
        validate_plugin(root, flavor, entry, plugin_root, &mut report);
    }

    if !is_present(metadata.and_then(|m| m.get("description"))) {
        report.warn("marketplace.json: no description in metadata");
    }

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "marketplace validated"
    );

    report
}

fn validate_plugin(
    root: &Path,
    flavor: PluginFlavor,
    entry: &Value,
    plugin_root: &str,
    report: &mut MarketplaceReport,
) {
    let name = name_text(entry.get("name"));
    let label = format!("plugin '{}'", name.as_deref().unwrap_or("(unnamed)"));

    let Some(name) = name else {
        report.error(format!("{}: missing 'name' field", label));
        return;
    };
    if !plugin_name().is_match(&name) {
        report.error(format!("{}: {}", label, PLUGIN_NAME_RULE));
    }

    let Some(source) = non_empty_str(entry.get("source")) else {
        report.error(format!("{}: missing or invalid 'source' field", label));
        return;
    };

    let resolved = match flavor {
        PluginFlavor::Claude => source.to_string(),
        PluginFlavor::Cursor => join_plugin_root(plugin_root, source),
    };

    if !is_safe_relative_path(source) || !is_safe_relative_path(&resolved) {
        report.error(match flavor {
            PluginFlavor::Claude => format!(
                "{}: source '{}' must be a safe relative path (no ../, no absolute)",
                label, source
            ),
            PluginFlavor::Cursor => format!(
                "{}: resolved source '{}' must be a safe relative path",
                label, resolved
            ),
        });
        return;
    }

    let plugin_dir = root.join(&resolved);
    if !plugin_dir.is_dir() {
        report.error(format!("{}: source directory not found: {}", label, resolved));
        return;
    }

    let manifest_path = plugin_dir.join(flavor.manifest_dir()).join("plugin.json");
    if !manifest_path.exists() {
        report.error(format!(
            "{}: missing {}/plugin.json",
            label,
            flavor.manifest_dir()
        ));
        return;
    }

    tracing::debug!(plugin = %name, dir = %plugin_dir.display(), "validating plugin");

    let Some(manifest) = read_manifest(&manifest_path, report) else {
        return;
    };

    if !is_present(manifest.get("name")) {
        report.error(format!("{}: plugin.json missing 'name' field", label));
    }

    if let Some(version) = manifest.get("version").filter(|v| !v.is_null()) {
        let valid = version
            .as_str()
            .is_some_and(|v| semver::Version::parse(v).is_ok());
        if !valid {
            report.warn(format!(
                "{}: plugin.json version '{}' is not valid semver",
                label,
                display_value(version)
            ));
        }
    }

    if flavor == PluginFlavor::Cursor {
        check_logo(&plugin_dir, &manifest, &label, report);
    }

    for field in PATH_FIELDS {
        let Some(value) = manifest.get(*field) else {
            continue;
        };
        for path in extract_paths(value) {
            if !is_safe_relative_path(path) {
                report.error(format!(
                    "{}: plugin.json '{}' contains unsafe path '{}'",
                    label, field, path
                ));
            } else if !plugin_dir.join(path).exists() {
                report.error(format!(
                    "{}: plugin.json '{}' references non-existent path '{}'",
                    label, field, path
                ));
            }
        }
    }

    if flavor == PluginFlavor::Cursor {
        check_skill_files(&plugin_dir, &label, report);
    }
}

fn check_logo(plugin_dir: &Path, manifest: &Value, label: &str, report: &mut MarketplaceReport) {
    let logo = manifest.get("logo");
    if !is_present(logo) {
        return;
    }

    match logo.and_then(Value::as_str) {
        Some(path) if is_safe_relative_path(path) => {
            if !plugin_dir.join(path).exists() {
                report.error(format!("{}: logo file not found: {}", label, path));
            }
        }
        _ => {
            let shown = logo.map(display_value).unwrap_or_default();
            report.error(format!("{}: logo path '{}' is not safe", label, shown));
        }
    }
}

/// `key: value` pairs of a frontmatter block, read line by line.
///
/// Skill descriptions often contain unquoted colons that strict YAML
/// rejects, so only the first colon on each line splits.
fn frontmatter_fields(frontmatter: &str) -> Vec<(&str, &str)> {
    frontmatter
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn check_skill_files(plugin_dir: &Path, label: &str, report: &mut MarketplaceReport) {
    let skills_dir = plugin_dir.join("skills");
    let Ok(entries) = std::fs::read_dir(&skills_dir) else {
        return;
    };

    let mut skill_names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_type()
                .is_ok_and(|t| t.is_dir() || t.is_symlink())
        })
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    skill_names.sort();

    for skill in skill_names {
        let skill_md = skills_dir.join(&skill).join("SKILL.md");
        if !skill_md.exists() {
            report.warn(format!("{}: skill '{}' missing SKILL.md", label, skill));
            continue;
        }

        let content = match safe_read_file(&skill_md) {
            Ok(content) => content,
            Err(e) => {
                report.error(format!(
                    "{}: skill '{}/SKILL.md' could not be read: {}",
                    label, skill, e
                ));
                continue;
            }
        };

        let parts = split_frontmatter(&content);
        if !parts.has_frontmatter || !parts.has_closing {
            report.error(format!(
                "{}: skill '{}/SKILL.md' missing YAML frontmatter",
                label, skill
            ));
            continue;
        }

        let fields = frontmatter_fields(&parts.frontmatter);
        for key in ["name", "description"] {
            let present = fields.iter().any(|(k, v)| *k == key && !v.is_empty());
            if !present {
                report.error(format!(
                    "{}: skill '{}/SKILL.md' frontmatter missing '{}'",
                    label, skill, key
                ));
            }
        }
    }
}
