//! Rule validators and the registry that selects one per skill
//!
//! Every skill names a validator. [`resolve`] looks it up in a fixed table
//! and falls back to [`BaseValidator`] for empty or unknown names, so a skill
//! without bespoke checks still gets the common ones.

pub mod base;
pub mod redis_cloud_api;
pub mod redis_development;

use crate::{diagnostics::ValidationError, rule::Rule};
use std::collections::HashMap;
use std::sync::OnceLock;

pub use base::{run_base_validations, BaseValidator};
pub use redis_cloud_api::RedisCloudApiValidator;
pub use redis_development::RedisDevelopmentValidator;

/// Trait for rule validators
///
/// Implementations must be stateless: the result of `validate_rule` depends
/// only on its arguments, which lets callers validate files in parallel.
pub trait RuleValidator: Send + Sync {
    /// Registry key, e.g. `"base"` or `"redis-development"`
    fn name(&self) -> &'static str;

    /// Validate a single rule.
    ///
    /// `file` identifies the rule file in messages; `content` is the raw
    /// file text for validators that inspect the document directly.
    fn validate_rule(&self, rule: &Rule, file: &str, content: &str) -> Vec<ValidationError>;

    /// Cross-rule checks over a whole skill.
    ///
    /// `None` means the validator has no skill-level checks. `rules` and
    /// `files` are parallel slices.
    fn validate_skill(&self, _rules: &[Rule], _files: &[String]) -> Option<Vec<ValidationError>> {
        None
    }
}

/// Name → validator table with a base fallback
pub struct ValidatorRegistry {
    validators: HashMap<&'static str, Box<dyn RuleValidator>>,
}

impl ValidatorRegistry {
    /// Registry holding the base validator only.
    pub fn new() -> Self {
        let mut registry = Self {
            validators: HashMap::new(),
        };
        registry.register(Box::new(BaseValidator));
        registry
    }

    /// Registry with every built-in validator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(RedisDevelopmentValidator));
        registry.register(Box::new(RedisCloudApiValidator));
        registry
    }

    /// Add a validator under its own name, replacing any previous entry.
    pub fn register(&mut self, validator: Box<dyn RuleValidator>) {
        self.validators.insert(validator.name(), validator);
    }

    /// Look up a validator, falling back to `base` for unknown names.
    pub fn resolve(&self, name: &str) -> &dyn RuleValidator {
        match self.validators.get(name) {
            Some(validator) => validator.as_ref(),
            None => self.base(),
        }
    }

    /// Whether `name` has its own entry (no fallback).
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.validators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn base(&self) -> &dyn RuleValidator {
        match self.validators.get(BaseValidator::NAME) {
            Some(validator) => validator.as_ref(),
            None => &BaseValidator,
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub(crate) fn default_registry() -> &'static ValidatorRegistry {
    static REGISTRY: OnceLock<ValidatorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ValidatorRegistry::with_defaults)
}

/// Resolve a validator from the built-in registry.
///
/// Never fails: `""` and unknown names yield the base validator.
pub fn resolve(name: &str) -> &'static dyn RuleValidator {
    default_registry().resolve(name)
}

/// Names of all built-in validators.
pub fn validator_names() -> Vec<&'static str> {
    default_registry().names()
}
