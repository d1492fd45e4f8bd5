//! Validator for the redis-development skill
//!
//! Rules here teach by example, so each one must carry code that is labelled
//! as either an anti-pattern ("Incorrect", "Avoid", ...) or a recommended
//! pattern ("Correct", "Usage", ...). One recognisable example of either
//! kind is enough.

use super::{run_base_validations, RuleValidator};
use crate::{
    diagnostics::ValidationError,
    rule::{CodeExample, Rule},
};

/// Label keywords marking an anti-pattern example
const BAD_LABELS: &[&str] = &["incorrect", "wrong", "bad", "avoid"];

/// Label keywords marking a recommended example
const GOOD_LABELS: &[&str] = &[
    "correct",
    "good",
    "usage",
    "implementation",
    "example",
    "recommended",
];

/// Case-insensitive substring match against a keyword set
fn label_matches(label: &str, keywords: &[&str]) -> bool {
    let lower = label.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword))
}

pub(crate) fn is_bad_example(example: &CodeExample) -> bool {
    label_matches(&example.label, BAD_LABELS)
}

pub(crate) fn is_good_example(example: &CodeExample) -> bool {
    label_matches(&example.label, GOOD_LABELS)
}

pub struct RedisDevelopmentValidator;

impl RuleValidator for RedisDevelopmentValidator {
    fn name(&self) -> &'static str {
        "redis-development"
    }

    fn validate_rule(&self, rule: &Rule, file: &str, content: &str) -> Vec<ValidationError> {
        let mut errors = run_base_validations(rule, file, content);

        if rule.examples.is_empty() {
            errors.push(ValidationError::new(
                file,
                &rule.id,
                "Missing examples (need at least one bad and one good example)",
            ));
            return errors;
        }

        let code_examples: Vec<&CodeExample> = rule.code_examples().collect();
        if code_examples.is_empty() {
            errors.push(ValidationError::new(file, &rule.id, "Missing code examples"));
            return errors;
        }

        let has_bad = code_examples.iter().any(|e| is_bad_example(e));
        let has_good = code_examples.iter().any(|e| is_good_example(e));

        // Either kind satisfies the rule; both are not required.
        if !has_bad && !has_good {
            errors.push(ValidationError::new(
                file,
                &rule.id,
                "Examples must include at least one bad/incorrect or good/correct example",
            ));
        }

        errors
    }
}
