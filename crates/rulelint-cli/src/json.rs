//! JSON output format support.
//!
//! Machine-readable reports for `rulelint rules --format json` and
//! `rulelint plugins --format json`.

use rulelint_core::{MarketplaceReport, PluginFlavor, SkillReport, ValidationError};
use serde::Serialize;

/// Root structure for `rules` JSON output.
#[derive(Debug, Serialize)]
pub struct RulesJsonOutput {
    /// Version of rulelint that produced this output.
    pub version: String,
    /// Number of rule files found across all validated skills.
    pub files_checked: usize,
    /// Skills that were validated, in order.
    pub skills: Vec<JsonSkill>,
    /// Every error, in report order.
    pub errors: Vec<ValidationError>,
    pub summary: JsonSummary,
}

#[derive(Debug, Serialize)]
pub struct JsonSkill {
    pub name: String,
    pub validator: String,
    pub rules_checked: usize,
    pub rules_dir_missing: bool,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub errors: usize,
}

/// Root structure for `plugins` JSON output.
#[derive(Debug, Serialize)]
pub struct PluginsJsonOutput {
    pub version: String,
    pub flavor: PluginFlavor,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Convert skill reports to JSON output format.
pub fn rules_to_json(reports: &[SkillReport]) -> RulesJsonOutput {
    let errors: Vec<ValidationError> = reports
        .iter()
        .flat_map(|r| r.errors.iter().cloned())
        .collect();

    RulesJsonOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        files_checked: reports.iter().map(|r| r.rules_checked).sum(),
        skills: reports
            .iter()
            .map(|r| JsonSkill {
                name: r.skill.clone(),
                validator: r.validator.clone(),
                rules_checked: r.rules_checked,
                rules_dir_missing: r.rules_dir_missing,
            })
            .collect(),
        summary: JsonSummary {
            errors: errors.len(),
        },
        errors,
    }
}

/// Convert a marketplace report to JSON output format.
pub fn plugins_to_json(flavor: PluginFlavor, report: &MarketplaceReport) -> PluginsJsonOutput {
    PluginsJsonOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        flavor,
        errors: report.errors.iter().map(|d| d.message.clone()).collect(),
        warnings: report.warnings.iter().map(|d| d.message.clone()).collect(),
    }
}
