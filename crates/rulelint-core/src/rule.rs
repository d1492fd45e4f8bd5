//! Parsed rule documents

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority attached to a rule, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM-HIGH")]
    MediumHigh,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW-MEDIUM")]
    LowMedium,
    #[serde(rename = "LOW")]
    Low,
}

impl ImpactLevel {
    /// All levels in descending order of impact.
    pub const ALL: [ImpactLevel; 6] = [
        ImpactLevel::Critical,
        ImpactLevel::High,
        ImpactLevel::MediumHigh,
        ImpactLevel::Medium,
        ImpactLevel::LowMedium,
        ImpactLevel::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::Critical => "CRITICAL",
            ImpactLevel::High => "HIGH",
            ImpactLevel::MediumHigh => "MEDIUM-HIGH",
            ImpactLevel::Medium => "MEDIUM",
            ImpactLevel::LowMedium => "LOW-MEDIUM",
            ImpactLevel::Low => "LOW",
        }
    }

    /// Exact, case-sensitive lookup. `"high"` is not a level.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }

    fn rank(self) -> u8 {
        match self {
            ImpactLevel::Critical => 5,
            ImpactLevel::High => 4,
            ImpactLevel::MediumHigh => 3,
            ImpactLevel::Medium => 2,
            ImpactLevel::LowMedium => 1,
            ImpactLevel::Low => 0,
        }
    }
}

impl PartialOrd for ImpactLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ImpactLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled snippet attached to a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExample {
    /// e.g. "Incorrect", "Correct (pipelined)", "Example"
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Prose following the code block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_text: Option<String>,
}

impl CodeExample {
    pub fn new(label: &str, code: &str) -> Self {
        Self {
            label: label.to_string(),
            code: code.to_string(),
            ..Self::default()
        }
    }

    /// Whether this example carries any code. Blank snippets are not counted
    /// as code examples anywhere.
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// One rule file after parsing.
///
/// `impact` keeps the raw frontmatter string so that an unknown value can be
/// reported verbatim; use [`Rule::impact_level`] for the typed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// "section.subsection", e.g. "1.1"
    pub id: String,
    pub title: String,
    pub section: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection: Option<u32>,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_description: Option<String>,
    pub explanation: String,
    pub examples: Vec<CodeExample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Rule {
    pub fn impact_level(&self) -> Option<ImpactLevel> {
        ImpactLevel::parse(&self.impact)
    }

    /// Examples whose code is not blank
    pub fn code_examples(&self) -> impl Iterator<Item = &CodeExample> {
        self.examples.iter().filter(|e| e.has_code())
    }
}
