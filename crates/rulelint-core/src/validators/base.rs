//! Checks shared by every skill: title, explanation, impact level

use super::RuleValidator;
use crate::{diagnostics::ValidationError, rule::ImpactLevel, rule::Rule};

/// Validator applied when a skill has no dedicated one
pub struct BaseValidator;

impl BaseValidator {
    pub const NAME: &'static str = "base";
}

impl RuleValidator for BaseValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_rule(&self, rule: &Rule, file: &str, _content: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if rule.title.trim().is_empty() {
            errors.push(ValidationError::new(file, &rule.id, "Missing or empty title"));
        }

        if rule.explanation.trim().is_empty() {
            errors.push(ValidationError::new(
                file,
                &rule.id,
                "Missing or empty explanation",
            ));
        }

        if rule.impact_level().is_none() {
            errors.push(ValidationError::new(
                file,
                &rule.id,
                format!(
                    "Invalid impact level: {}. Must be one of: {}",
                    rule.impact,
                    valid_impacts()
                ),
            ));
        }

        errors
    }
}

fn valid_impacts() -> String {
    ImpactLevel::ALL
        .iter()
        .map(|level| level.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the base checks from inside another validator.
pub fn run_base_validations(rule: &Rule, file: &str, content: &str) -> Vec<ValidationError> {
    BaseValidator.validate_rule(rule, file, content)
}
