//! # rulelint-core
//!
//! Validation engine for skill rule files and plugin marketplaces.
//!
//! Validates:
//! - Rule documents under `skills/<skill>/rules/*.md`, with a validator
//!   chosen per skill from a registry that falls back to `base`
//! - Claude and Cursor plugin marketplace manifests and the plugins they list

pub mod config;
pub mod diagnostics;
pub mod file_utils;
pub mod marketplace;
pub mod parsers;
mod regex_util;
pub mod rule;
pub mod validators;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

pub use config::{LintConfig, SkillConfig};
pub use diagnostics::{
    DiagnosticLevel, LintError, LintResult, ManifestDiagnostic, ValidationError,
};
pub use marketplace::{validate_marketplace, MarketplaceReport, PluginFlavor};
pub use rule::{CodeExample, ImpactLevel, Rule};
pub use validators::{resolve, validator_names, RuleValidator, ValidatorRegistry};

/// Outcome of validating one skill's rule directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReport {
    pub skill: String,
    /// Name of the validator that actually ran (after fallback)
    pub validator: String,
    pub rules_checked: usize,
    pub errors: Vec<ValidationError>,
    /// The rules directory does not exist; nothing was checked
    pub rules_dir_missing: bool,
}

impl SkillReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A rule file that was read and parsed
struct ParsedRule {
    file: String,
    content: String,
    rule: Rule,
}

/// Rule files directly inside `dir`, sorted by name.
///
/// Names starting with `_` are partials and skipped. Symlinks are kept so
/// that the read step can report them.
fn collect_rule_files(dir: &Path, root: &Path, exclude: &[glob::Pattern]) -> Vec<PathBuf> {
    use ignore::WalkBuilder;

    let mut paths: Vec<PathBuf> = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.depth() == 1)
        .filter(|entry| entry.file_type().is_some_and(|t| !t.is_dir()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.ends_with(".md") && !name.starts_with('_'))
        })
        .filter(|path| !is_excluded(path, root, exclude))
        .collect();

    paths.sort();
    paths
}

fn is_excluded(path: &Path, root: &Path, exclude: &[glob::Pattern]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    exclude
        .iter()
        .any(|p| p.matches(file_name) || p.matches(&relative))
}

fn read_and_parse(path: &Path, skill: &SkillConfig, max_size: u64) -> Result<ParsedRule, ValidationError> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(file = %file, "parsing rule file");

    let content = file_utils::safe_read_file_with_limit(path, max_size)
        .map_err(|e| ValidationError::for_file(&file, format!("Failed to parse: {}", e)))?;
    let rule = parsers::parse_rule(&content, &file, &skill.section_map)
        .map_err(|e| ValidationError::for_file(&file, format!("Failed to parse: {}", e)))?;

    Ok(ParsedRule {
        file,
        content,
        rule,
    })
}

/// Number rules within each section in file-name order: `"3.1"`, `"3.2"`, ...
fn assign_ids(parsed: &mut [ParsedRule]) {
    let mut counters: HashMap<u32, u32> = HashMap::new();
    for entry in parsed.iter_mut() {
        let counter = counters.entry(entry.rule.section).or_insert(0);
        *counter += 1;
        entry.rule.subsection = Some(*counter);
        entry.rule.id = format!("{}.{}", entry.rule.section, counter);
    }
}

/// Validate every rule file of one skill.
///
/// Files that cannot be read or parsed become a single "Failed to parse"
/// error each and do not stop the run. A missing rules directory yields an
/// empty report with `rules_dir_missing` set.
pub fn validate_skill(
    root: &Path,
    name: &str,
    skill: &SkillConfig,
    config: &LintConfig,
) -> LintResult<SkillReport> {
    validate_skill_with_registry(root, name, skill, config, validators::default_registry())
}

/// Validate one skill, resolving its validator from `registry`.
pub fn validate_skill_with_registry(
    root: &Path,
    name: &str,
    skill: &SkillConfig,
    config: &LintConfig,
    registry: &ValidatorRegistry,
) -> LintResult<SkillReport> {
    let validator = registry.resolve(skill.validator_name(name));
    let dir = config.rules_dir(root, name, skill);

    tracing::debug!(
        skill = name,
        validator = validator.name(),
        dir = %dir.display(),
        "validating skill"
    );

    let mut report = SkillReport {
        skill: name.to_string(),
        validator: validator.name().to_string(),
        rules_checked: 0,
        errors: Vec::new(),
        rules_dir_missing: false,
    };

    if !dir.is_dir() {
        tracing::warn!(skill = name, dir = %dir.display(), "no rules directory found");
        report.rules_dir_missing = true;
        return Ok(report);
    }

    let exclude = config.exclude_patterns()?;
    let files = collect_rule_files(&dir, root, &exclude);
    report.rules_checked = files.len();

    let outcomes: Vec<Result<ParsedRule, ValidationError>> = files
        .par_iter()
        .map(|path| read_and_parse(path, skill, config.max_file_size))
        .collect();

    let mut parsed = Vec::new();
    let mut slots: Vec<Result<usize, ValidationError>> = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(p) => {
                slots.push(Ok(parsed.len()));
                parsed.push(p);
            }
            Err(e) => slots.push(Err(e)),
        }
    }

    assign_ids(&mut parsed);

    let mut per_rule: Vec<Vec<ValidationError>> = parsed
        .par_iter()
        .map(|p| validator.validate_rule(&p.rule, &p.file, &p.content))
        .collect();

    for slot in slots {
        match slot {
            Ok(index) => report.errors.append(&mut per_rule[index]),
            Err(e) => report.errors.push(e),
        }
    }

    let rules: Vec<Rule> = parsed.iter().map(|p| p.rule.clone()).collect();
    let names: Vec<String> = parsed.iter().map(|p| p.file.clone()).collect();
    if let Some(skill_errors) = validator.validate_skill(&rules, &names) {
        report.errors.extend(skill_errors);
    }

    tracing::debug!(
        skill = name,
        rules = report.rules_checked,
        errors = report.errors.len(),
        "skill validated"
    );

    Ok(report)
}

/// Validate several skills in the given order.
///
/// Fails before validating anything if a name is not configured.
pub fn validate_skills(
    root: &Path,
    names: &[String],
    config: &LintConfig,
) -> LintResult<Vec<SkillReport>> {
    let skills = names
        .iter()
        .map(|name| config.skill(name).map(|skill| (name, skill)))
        .collect::<LintResult<Vec<_>>>()?;

    skills
        .into_iter()
        .map(|(name, skill)| validate_skill(root, name, skill, config))
        .collect()
}
