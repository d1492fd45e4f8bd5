//! Linter configuration

use crate::diagnostics::{LintError, LintResult};
use crate::file_utils::DEFAULT_MAX_FILE_SIZE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name looked up in the project root when no `--config` is given
pub const CONFIG_FILE_NAME: &str = ".rulelint.toml";

/// Configuration for the linter
///
/// Every field has a default, so a config file only needs the keys it
/// changes. A `[skills]` table replaces the built-in skill set as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LintConfig {
    /// Directory holding one subdirectory per skill, relative to the root
    pub skills_dir: PathBuf,

    /// Skill validated when none is named on the command line
    pub default_skill: String,

    /// Glob patterns for rule files to skip, matched against the file name
    /// and the root-relative path
    pub exclude: Vec<String>,

    /// Rule files larger than this many bytes are reported instead of read
    pub max_file_size: u64,

    /// Skills by name
    pub skills: BTreeMap<String, SkillConfig>,
}

/// One skill: a directory of rule files sharing a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SkillConfig {
    pub title: String,
    pub description: String,

    /// Rule directory, relative to the skill directory
    pub rules_dir: PathBuf,

    /// File-name prefix → section number
    pub section_map: BTreeMap<String, u32>,

    /// Validator name; defaults to the skill name. Unknown names fall back
    /// to `base`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            rules_dir: PathBuf::from("rules"),
            section_map: BTreeMap::new(),
            validator: None,
        }
    }
}

impl SkillConfig {
    /// Validator to resolve for a skill registered under `skill_name`
    pub fn validator_name<'a>(&'a self, skill_name: &'a str) -> &'a str {
        self.validator
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(skill_name)
    }
}

fn section_map(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries
        .iter()
        .map(|(prefix, section)| (prefix.to_string(), *section))
        .collect()
}

fn builtin_skills() -> BTreeMap<String, SkillConfig> {
    let mut skills = BTreeMap::new();

    skills.insert(
        "redis-development".to_string(),
        SkillConfig {
            title: "Redis Development".to_string(),
            description: "This document is mainly for agents and LLMs to follow when maintaining, \
                generating, or refactoring Redis applications. Humans may also find it useful, \
                but guidance here is optimized for automation and consistency by AI-assisted \
                workflows."
                .to_string(),
            section_map: section_map(&[
                ("data", 1),
                ("ram", 2),
                ("conn", 3),
                ("json", 4),
                ("rqe", 5),
                ("vector", 6),
                ("semantic-cache", 7),
                ("stream", 8),
                ("cluster", 9),
                ("security", 10),
                ("observe", 11),
            ]),
            validator: Some("redis-development".to_string()),
            ..SkillConfig::default()
        },
    );

    skills.insert(
        "redis-cloud-api".to_string(),
        SkillConfig {
            title: "Redis Cloud API".to_string(),
            description: "This document is mainly for agents and LLMs to follow when working \
                with the Redis Cloud API. Humans may also find it useful, but guidance here is \
                optimized for automation and consistency by AI-assisted workflows."
                .to_string(),
            section_map: section_map(&[
                ("auth", 1),
                ("tasks", 2),
                ("sub-pro", 3),
                ("sub-ess", 4),
                ("db-pro", 5),
                ("db-ess", 6),
                ("conn", 7),
                ("rbac", 8),
                ("cloud", 9),
                ("account", 10),
                ("errors", 11),
            ]),
            validator: Some("redis-cloud-api".to_string()),
            ..SkillConfig::default()
        },
    );

    skills
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            skills_dir: PathBuf::from("skills"),
            default_skill: "redis-development".to_string(),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            skills: builtin_skills(),
        }
    }
}

impl LintConfig {
    /// Load config from file
    pub fn load(path: &Path) -> LintResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LintError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|source| LintError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the given file, or `.rulelint.toml` under `root` if it exists,
    /// or fall back to the defaults.
    ///
    /// An explicit path that cannot be read is an error; the implicit one is
    /// only used when present.
    pub fn load_or_default(path: Option<&Path>, root: &Path) -> LintResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let implicit = root.join(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    Self::load(&implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Configured skill names, sorted
    pub fn skill_names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }

    /// Look up a skill by name.
    pub fn skill(&self, name: &str) -> LintResult<&SkillConfig> {
        self.skills.get(name).ok_or_else(|| LintError::UnknownSkill {
            name: name.to_string(),
            available: self.skill_names(),
        })
    }

    /// Directory holding the rule files of `name`
    pub fn rules_dir(&self, root: &Path, name: &str, skill: &SkillConfig) -> PathBuf {
        root.join(&self.skills_dir).join(name).join(&skill.rules_dir)
    }

    /// Compile `exclude` into glob patterns.
    pub fn exclude_patterns(&self) -> LintResult<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|source| LintError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Default config rendered as TOML, as written by `rulelint init`
    pub fn default_toml() -> LintResult<String> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| LintError::Other(anyhow::anyhow!("Failed to serialize config: {}", e)))
    }
}
